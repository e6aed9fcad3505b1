mod catalog;
mod config;
mod frontmatter;
mod sync;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Parser;

use catalog::Catalog;
use config::Overrides;
use sync::{SyncReport, Synchronizer};

#[derive(Parser)]
#[command(
    name = "prompt-sync",
    version,
    about = "Copy agent prompt bodies from markdown files into the agent catalog"
)]
struct Cli {
    /// Optional TOML config file with a [sync] table
    #[arg(short, long)]
    config: Option<String>,
    /// JSON catalog to update in place
    #[arg(long, env = "PROMPT_SYNC_CATALOG")]
    catalog: Option<PathBuf>,
    /// Directory holding `<id>.<extension>` prompt files
    #[arg(long, env = "PROMPT_SYNC_AGENTS_DIR")]
    agents_dir: Option<PathBuf>,
    /// Companion file extension
    #[arg(long)]
    extension: Option<String>,
    /// Report what would change without writing the catalog
    #[arg(long)]
    dry_run: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(summary) => println!("\n{summary}"),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Sync the catalog and return the closing line for stdout.
fn run(cli: Cli) -> Result<String> {
    let cfg = match cli.config.as_deref() {
        Some(path) => config::load(path)?,
        None => config::Config::default(),
    };
    let settings = config::resolve(
        cfg,
        Overrides {
            catalog: cli.catalog,
            agents_dir: cli.agents_dir,
            extension: cli.extension,
        },
    )?;

    let mut catalog = Catalog::load(&settings.catalog)?;
    let report = Synchronizer::new(&settings).sync(&mut catalog)?;
    for outcome in &report.outcomes {
        println!("{outcome}");
    }
    tracing::info!(
        "{} updated, {} skipped",
        report.updated(),
        report.skipped()
    );

    if !cli.dry_run {
        catalog.save(&settings.catalog)?;
    }
    Ok(summary_line(&settings.catalog, &report, cli.dry_run))
}

fn summary_line(catalog: &Path, report: &SyncReport, dry_run: bool) -> String {
    if dry_run {
        format!(
            "Dry run: {} not written ({} records would change)",
            catalog.display(),
            report.updated()
        )
    } else {
        format!("Successfully updated {}", catalog.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CATALOG: &str = r#"[{"id": "alpha", "prompt": "old"}, {"id": "beta", "prompt": "keep-me"}]"#;

    fn workspace() -> (TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let catalog = dir.path().join("agents.json");
        let agents = dir.path().join("agents");
        std::fs::create_dir(&agents).unwrap();
        std::fs::write(&catalog, CATALOG).unwrap();
        std::fs::write(agents.join("alpha.md"), "---\ntitle: x\n---\nHello world.\n").unwrap();
        (dir, catalog, agents)
    }

    fn cli(catalog: &Path, agents: &Path, extra: &[&str]) -> Cli {
        let mut args = vec![
            "prompt-sync".to_string(),
            "--catalog".to_string(),
            catalog.display().to_string(),
            "--agents-dir".to_string(),
            agents.display().to_string(),
        ];
        args.extend(extra.iter().map(|a| a.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_run_rewrites_catalog() {
        let (_dir, catalog, agents) = workspace();
        let summary = run(cli(&catalog, &agents, &[])).unwrap();

        assert_eq!(summary, format!("Successfully updated {}", catalog.display()));
        assert_eq!(
            std::fs::read_to_string(&catalog).unwrap(),
            "[\n  {\n    \"id\": \"alpha\",\n    \"prompt\": \"Hello world.\"\n  },\n  {\n    \"id\": \"beta\",\n    \"prompt\": \"keep-me\"\n  }\n]"
        );
    }

    #[test]
    fn test_dry_run_leaves_catalog_bytes() {
        let (_dir, catalog, agents) = workspace();
        let summary = run(cli(&catalog, &agents, &["--dry-run"])).unwrap();

        assert_eq!(
            summary,
            format!("Dry run: {} not written (1 records would change)", catalog.display())
        );
        assert_eq!(std::fs::read_to_string(&catalog).unwrap(), CATALOG);
    }

    #[test]
    fn test_run_reads_config_file() {
        let (dir, catalog, agents) = workspace();
        std::fs::rename(agents.join("alpha.md"), agents.join("alpha.txt")).unwrap();
        let cfg = dir.path().join("sync.toml");
        std::fs::write(&cfg, "[sync]\nextension = \"txt\"\n").unwrap();

        let cfg = cfg.display().to_string();
        run(cli(&catalog, &agents, &["--config", &cfg])).unwrap();
        let synced = Catalog::load(&catalog).unwrap();
        assert_eq!(synced.records[0].prompt(), Some("Hello world."));
    }

    #[test]
    fn test_run_fails_on_missing_catalog() {
        let (dir, _catalog, agents) = workspace();
        let missing = dir.path().join("nope.json");
        let err = run(cli(&missing, &agents, &[])).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read catalog"));
        assert!(!missing.exists());
    }
}
