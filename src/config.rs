use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::path::PathBuf;

use crate::frontmatter::DEFAULT_DELIMITER;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
}

#[derive(Debug, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_catalog")]
    pub catalog: PathBuf,
    #[serde(default = "default_agents_dir")]
    pub agents_dir: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            catalog: default_catalog(),
            agents_dir: default_agents_dir(),
            extension: default_extension(),
            delimiter: default_delimiter(),
        }
    }
}

fn default_catalog() -> PathBuf {
    PathBuf::from("agent-gallery/src/data/agents.json")
}

fn default_agents_dir() -> PathBuf {
    PathBuf::from("agent-gallery/agents")
}

fn default_extension() -> String {
    "md".to_string()
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub catalog: Option<PathBuf>,
    pub agents_dir: Option<PathBuf>,
    pub extension: Option<String>,
}

/// Fully resolved, validated settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub catalog: PathBuf,
    pub agents_dir: PathBuf,
    pub extension: String,
    pub delimiter: String,
}

pub fn load(path: &str) -> Result<Config> {
    let path = expand_tilde(path);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

pub fn resolve(config: Config, overrides: Overrides) -> Result<Settings> {
    let SyncConfig {
        catalog,
        agents_dir,
        extension,
        delimiter,
    } = config.sync;

    let extension = overrides.extension.unwrap_or(extension);
    let extension = extension.trim_start_matches('.').to_string();
    if extension.is_empty() {
        bail!("extension must not be empty");
    }
    if delimiter.is_empty() {
        bail!("delimiter must not be empty");
    }

    Ok(Settings {
        catalog: overrides.catalog.unwrap_or(catalog),
        agents_dir: overrides.agents_dir.unwrap_or(agents_dir),
        extension,
        delimiter,
    })
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
