use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};

use crate::catalog::Catalog;
use crate::config::Settings;
use crate::frontmatter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Updated { id: String, chars: usize },
    /// Body matched the existing prompt; printed the same as `Updated`.
    Unchanged { id: String, chars: usize },
    MissingFile { id: String },
    NoContent { id: String },
    /// Id cannot name a file under the agents dir (empty, absolute or escaping it).
    UnsafeId { id: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Updated { id, chars } | Outcome::Unchanged { id, chars } => {
                write!(f, "Updated {id} - prompt length: {chars} characters")
            }
            Outcome::MissingFile { id } => write!(f, "Warning: Markdown file not found for {id}"),
            Outcome::NoContent { id } => write!(f, "Warning: No prompt content found for {id}"),
            Outcome::UnsafeId { id } => {
                write!(f, "Warning: Id {id:?} does not name a file under the agents directory")
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub outcomes: Vec<Outcome>,
}

impl SyncReport {
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, Outcome::Updated { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    Outcome::MissingFile { .. } | Outcome::NoContent { .. } | Outcome::UnsafeId { .. }
                )
            })
            .count()
    }
}

pub struct Synchronizer {
    agents_dir: PathBuf,
    extension: String,
    delimiter: String,
}

impl Synchronizer {
    pub fn new(settings: &Settings) -> Self {
        Self {
            agents_dir: settings.agents_dir.clone(),
            extension: settings.extension.clone(),
            delimiter: settings.delimiter.clone(),
        }
    }

    pub fn companion_path(&self, id: &str) -> PathBuf {
        self.agents_dir.join(format!("{id}.{}", self.extension))
    }

    /// Pull each record's prompt from its companion file. Records without a
    /// usable file keep their current prompt.
    pub fn sync(&self, catalog: &mut Catalog) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for (i, record) in catalog.records.iter_mut().enumerate() {
            let id = record
                .id()
                .with_context(|| format!("Invalid catalog record {i}"))?
                .to_string();
            if !is_relative_file_id(&id) {
                report.outcomes.push(Outcome::UnsafeId { id });
                continue;
            }

            let path = self.companion_path(&id);
            tracing::debug!("Resolving {id} -> {}", path.display());
            if !path.exists() {
                report.outcomes.push(Outcome::MissingFile { id });
                continue;
            }

            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read companion file: {}", path.display()))?;
            let Some(body) = frontmatter::extract_body(&content, &self.delimiter) else {
                report.outcomes.push(Outcome::NoContent { id });
                continue;
            };

            let chars = body.chars().count();
            if record.prompt() == Some(body) {
                report.outcomes.push(Outcome::Unchanged { id, chars });
            } else {
                record.set_prompt(body);
                report.outcomes.push(Outcome::Updated { id, chars });
            }
        }

        Ok(report)
    }
}

/// Ids may nest (`team/alpha`) but must stay below the agents dir.
fn is_relative_file_id(id: &str) -> bool {
    !id.is_empty()
        && !id.ends_with(['/', '\\'])
        && Path::new(id)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}
