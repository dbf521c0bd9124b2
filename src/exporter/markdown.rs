// file: src/exporter/markdown.rs
// description: atomic file writes and the consolidated markdown writer
// reference: https://docs.rs/tempfile/latest/tempfile/struct.NamedTempFile.html#method.persist

use crate::error::{PipelineError, Result};
use crate::renderer::RenderedDocument;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

/// Writes `contents` to a temporary file beside `path` and renames it into
/// place, so readers never observe a partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    fs::create_dir_all(&parent).map_err(|e| PipelineError::file_operation(&parent, e))?;

    let mut temp = NamedTempFile::new_in(&parent).map_err(|e| PipelineError::file_operation(&parent, e))?;
    temp.write_all(contents)
        .map_err(|e| PipelineError::file_operation(path, e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| PipelineError::file_operation(path, e))?;

    temp.persist(path)
        .map_err(|e| PipelineError::file_operation(path, e.error))?;

    Ok(())
}

pub struct MarkdownWriter {
    path: PathBuf,
}

impl MarkdownWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write(&self, document: &RenderedDocument) -> Result<PathBuf> {
        let markdown = document.to_markdown();
        write_atomic(&self.path, markdown.as_bytes())?;

        info!(
            "Wrote {} entries in {} sections to {}",
            document.entry_count(),
            document.sections.len(),
            self.path.display()
        );
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GroupBy;
    use crate::models::code_unit::sample_unit;
    use crate::models::{DocumentationEntry, UnitKind};
    use crate::renderer::DocumentRenderer;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_directories() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("nested/dir/out.txt");

        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        let leftovers = fs::read_dir(target.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_markdown_writer() {
        let temp = TempDir::new().unwrap();
        let writer = MarkdownWriter::new(temp.path().join("docs/api.md"));
        let entry = DocumentationEntry::new(
            sample_unit(UnitKind::Function, "add", "calc.py", 1),
            "doc for add".to_string(),
        );
        let document = DocumentRenderer::new(GroupBy::Module).render("API", vec![entry]);

        let path = writer.write(&document).unwrap();

        let written = fs::read_to_string(path).unwrap();
        assert!(written.starts_with("# API\n"));
        assert!(written.contains("## calc\n\ndoc for add\n\n---\n"));
    }
}
