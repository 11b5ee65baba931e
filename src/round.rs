use crate::model::RoundSnapshot;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// On-disk format of a round snapshot, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Yaml,
    Json,
}

impl SnapshotFormat {
    /// `.json` means JSON; everything else (`.yaml`, `.yml`, no extension)
    /// is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SnapshotFormat::Json,
            _ => SnapshotFormat::Yaml,
        }
    }
}

/// Load a round snapshot (criteria, judges, evaluations) from a file.
///
/// # Errors
///
/// Returns an error if the file does not exist, cannot be read, or does not
/// parse as a round snapshot in the format its extension implies.
pub fn load_snapshot(path: &Path) -> Result<RoundSnapshot> {
    if !path.exists() {
        anyhow::bail!("Round file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read round file at {}", path.display()))?;

    parse_snapshot(&content, SnapshotFormat::from_path(path))
        .with_context(|| format!("Failed to parse round file at {}", path.display()))
}

/// Parse snapshot content in the given format.
pub fn parse_snapshot(content: &str, format: SnapshotFormat) -> Result<RoundSnapshot> {
    let snapshot = match format {
        SnapshotFormat::Yaml => {
            serde_saphyr::from_str(content).context("invalid YAML round snapshot")?
        }
        SnapshotFormat::Json => {
            serde_json::from_str(content).context("invalid JSON round snapshot")?
        }
    };
    Ok(snapshot)
}
