// file: src/exporter/test_files.rs
// description: writes rendered test modules under the tests output directory
// reference: internal data structures

use crate::error::Result;
use crate::exporter::markdown::write_atomic;
use crate::renderer::TestFile;
use std::path::PathBuf;
use tracing::info;

pub struct TestFileWriter {
    root: PathBuf,
}

impl TestFileWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Writes each file atomically and returns the written paths in order.
    pub fn write_all(&self, files: &[TestFile]) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(files.len());

        for file in files {
            let path = self.root.join(&file.relative_path);
            write_atomic(&path, file.body.as_bytes())?;
            info!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}
