use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One agent entry. Keys keep their file order; only `prompt` is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn id(&self) -> Result<&str> {
        match self.0.get("id") {
            Some(Value::String(id)) => Ok(id.as_str()),
            Some(other) => bail!("record id must be a string, got {other}"),
            None => bail!("record has no \"id\" field"),
        }
    }

    pub fn prompt(&self) -> Option<&str> {
        self.0.get("prompt").and_then(Value::as_str)
    }

    /// Overwrite `prompt` in place; a record without one gets it appended.
    pub fn set_prompt(&mut self, text: &str) {
        self.0
            .insert("prompt".to_string(), Value::String(text.to_string()));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub records: Vec<Record>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let catalog = Self::from_json(&content)
            .with_context(|| format!("Failed to parse catalog: {}", path.display()))?;
        tracing::info!(
            "Loaded {} records from {}",
            catalog.records.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(content)?;
        let Value::Array(items) = value else {
            bail!("catalog must be a JSON array");
        };
        let records = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(map) => Ok(Record(map)),
                _ => bail!("catalog entry {i} is not a JSON object"),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { records })
    }

    /// Two-space indented JSON with non-ASCII left unescaped.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Write through a temp file and rename so a failed write leaves the old catalog intact.
    /// A symlinked catalog is written at its target and the target keeps its permissions.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let file_name = target
            .file_name()
            .with_context(|| format!("Catalog path has no file name: {}", path.display()))?;
        let mut tmp_name = file_name.to_os_string();
        tmp_name.push(".tmp");
        let tmp = target.with_file_name(tmp_name);

        std::fs::write(&tmp, &json)
            .with_context(|| format!("Failed to write catalog: {}", tmp.display()))?;
        if let Err(e) = replace(&tmp, &target) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e)
                .with_context(|| format!("Failed to replace catalog: {}", target.display()));
        }
        tracing::info!("Wrote {} records to {}", self.records.len(), target.display());
        Ok(())
    }
}

fn replace(tmp: &Path, target: &Path) -> std::io::Result<()> {
    if let Ok(meta) = std::fs::metadata(target) {
        std::fs::set_permissions(tmp, meta.permissions())?;
    }
    std::fs::rename(tmp, target)
}
