// file: src/pipeline/processor.rs
// description: turns scanned python files into code units ready for generation
// reference: reads sources, runs the tree-sitter extractor and framework detection

use crate::error::{PipelineError, Result};
use crate::models::CodeUnit;
use crate::parser::PythonExtractor;
use crate::repository::{FrameworkClassifier, ScannedFile, WebFramework};
use std::fs;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub file: ScannedFile,
    pub units: Vec<CodeUnit>,
    pub web: Option<WebFramework>,
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub files: Vec<ProcessedFile>,
    /// Relative paths of files skipped after a recoverable failure.
    pub skipped: Vec<String>,
}

impl Extraction {
    pub fn unit_count(&self) -> usize {
        self.files.iter().map(|f| f.units.len()).sum()
    }

    /// All units in scan order, then source order.
    pub fn units(&self) -> impl Iterator<Item = &CodeUnit> {
        self.files.iter().flat_map(|f| f.units.iter())
    }
}

pub struct FileProcessor {
    extractor: PythonExtractor,
    classifier: FrameworkClassifier,
}

impl FileProcessor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            extractor: PythonExtractor::new()?,
            classifier: FrameworkClassifier::new(),
        })
    }

    pub fn process(&mut self, scanned_file: &ScannedFile) -> Result<ProcessedFile> {
        debug!("Processing file: {}", scanned_file.relative_path);

        let content = fs::read_to_string(&scanned_file.path)
            .map_err(|e| PipelineError::file_operation(&scanned_file.path, e))?;

        let units = self
            .extractor
            .extract(&content, &scanned_file.path, &scanned_file.relative_path)?;
        let web = self.classifier.detect(&content);

        Ok(ProcessedFile {
            file: scanned_file.clone(),
            units,
            web,
        })
    }

    /// Processes every file; recoverable failures are logged and the file
    /// is skipped.
    pub fn process_all(&mut self, files: &[ScannedFile]) -> Result<Extraction> {
        let mut extraction = Extraction::default();

        for file in files {
            match self.process(file) {
                Ok(processed) => extraction.files.push(processed),
                Err(err) if err.is_recoverable() => {
                    warn!("Skipping {}: {}", file.relative_path, err);
                    extraction.skipped.push(file.relative_path.clone());
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            "Extracted {} units from {} files ({} skipped)",
            extraction.unit_count(),
            extraction.files.len(),
            extraction.skipped.len()
        );
        Ok(extraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::repository::FileScanner;
    use tempfile::TempDir;

    #[test]
    fn test_process_all_skips_broken_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("good.py"), "def add(a, b):\n    return a + b\n").unwrap();
        fs::write(temp.path().join("bad.py"), "def broken(:\n").unwrap();
        fs::write(
            temp.path().join("web.py"),
            "from flask import Flask\napp = Flask(__name__)\n\n@app.route('/')\ndef index():\n    return 'hi'\n",
        )
        .unwrap();

        let files = FileScanner::new(&Config::default_config().source)
            .scan_directory(temp.path())
            .unwrap();
        let extraction = FileProcessor::new().unwrap().process_all(&files).unwrap();

        assert_eq!(extraction.skipped, vec!["bad.py".to_string()]);
        assert_eq!(extraction.unit_count(), 2);
        let names: Vec<_> = extraction.units().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["add", "index"]);
        assert_eq!(extraction.files[1].web, Some(WebFramework::Flask));
        assert_eq!(extraction.files[0].web, None);
    }

    #[test]
    fn test_invalid_utf8_is_recoverable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("latin.py");
        fs::write(&path, [0x63, 0x61, 0x66, 0xe9, 0x0a]).unwrap();

        let file = ScannedFile {
            path,
            relative_path: "latin.py".to_string(),
            size: 5,
        };
        let err = FileProcessor::new().unwrap().process(&file).unwrap_err();

        assert!(err.is_recoverable());
    }
}
