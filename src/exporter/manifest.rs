// file: src/exporter/manifest.rs
// description: json summary of a generation run written next to its artifacts
// reference: https://docs.rs/serde_json

use crate::error::Result;
use crate::exporter::markdown::write_atomic;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

pub const MANIFEST_FILE_NAME: &str = "autodoc-manifest.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounts {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub units_extracted: usize,
    pub units_generated: usize,
    pub retries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunManifest {
    pub generated_at: String,
    pub command: String,
    pub model: String,
    pub sources: Vec<PathBuf>,
    pub counts: RunCounts,
    pub cancelled: bool,
    pub artifacts: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_skipped: Option<String>,
}

impl RunManifest {
    pub fn new(command: &str, model: &str, sources: &[PathBuf]) -> Self {
        Self {
            generated_at: Utc::now().to_rfc3339(),
            command: command.to_string(),
            model: model.to_string(),
            sources: sources.to_vec(),
            counts: RunCounts::default(),
            cancelled: false,
            artifacts: Vec::new(),
            pdf_skipped: None,
        }
    }

    pub fn add_artifact(&mut self, path: impl Into<PathBuf>) {
        self.artifacts.push(path.into());
    }

    /// Writes `autodoc-manifest.json` into `dir` and returns its path.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(MANIFEST_FILE_NAME);
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(&path, json.as_bytes())?;

        info!(
            "Manifest written to {} ({} artifacts)",
            path.display(),
            self.artifacts.len()
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_manifest_written_as_json() {
        let dir = tempdir().unwrap();
        let mut manifest = RunManifest::new("generate", "models/gemini-1.5-flash", &[PathBuf::from("src")]);
        manifest.counts.units_generated = 2;
        manifest.add_artifact(dir.path().join("docs.md"));

        let path = manifest.write_to(dir.path()).unwrap();

        let parsed: RunManifest = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed, manifest);
        assert!(chrono::DateTime::parse_from_rfc3339(&parsed.generated_at).is_ok());
    }

    #[test]
    fn test_pdf_skip_reason_omitted_when_absent() {
        let manifest = RunManifest::new("tests", "m", &[]);
        let json = serde_json::to_string(&manifest).unwrap();
        assert!(!json.contains("pdf_skipped"));
    }
}
