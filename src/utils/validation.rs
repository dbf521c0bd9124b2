// file: src/utils/validation.rs
// description: input validation for cli arguments and configuration values
// reference: input validation patterns

use crate::error::{PipelineError, Result};
use std::path::Path;

pub struct Validator;

impl Validator {
    pub fn validate_directory(path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(PipelineError::SourceNotFound(path.to_path_buf()));
        }

        if !path.is_dir() {
            return Err(PipelineError::Validation(format!(
                "Path is not a directory: {}",
                path.display()
            )));
        }

        Ok(())
    }

    /// An existing, non-empty `.md` or `.markdown` file.
    pub fn validate_markdown_input(path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(PipelineError::Validation(format!(
                "Markdown file does not exist: {}",
                path.display()
            )));
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("md") | Some("markdown") => Ok(()),
            _ => Err(PipelineError::Validation(format!(
                "File is not a markdown file: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_pdf_output(path: &Path) -> Result<()> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("pdf") => Ok(()),
            _ => Err(PipelineError::Validation(format!(
                "Output file must have a .pdf extension: {}",
                path.display()
            ))),
        }
    }

    pub fn validate_base_url(url: &str) -> Result<()> {
        let rest = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"));

        match rest {
            Some(host) if !host.trim_matches('/').is_empty() => Ok(()),
            _ => Err(PipelineError::Config(format!(
                "Invalid API base URL: {}",
                url
            ))),
        }
    }

    /// Shortens `text` to at most `max_chars` characters for log output.
    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &text[..cut]),
            None => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_directory() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("a.py");
        fs::write(&file, "x = 1\n").unwrap();

        assert!(Validator::validate_directory(temp.path()).is_ok());
        assert!(matches!(
            Validator::validate_directory(Path::new("/nonexistent")),
            Err(PipelineError::SourceNotFound(_))
        ));
        assert!(Validator::validate_directory(&file).is_err());
    }

    #[test]
    fn test_validate_markdown_input() {
        let temp = TempDir::new().unwrap();
        let md = temp.path().join("docs.md");
        let txt = temp.path().join("docs.txt");
        fs::write(&md, "# Docs\n").unwrap();
        fs::write(&txt, "docs").unwrap();

        assert!(Validator::validate_markdown_input(&md).is_ok());
        assert!(Validator::validate_markdown_input(&txt).is_err());
        assert!(Validator::validate_markdown_input(&temp.path().join("missing.md")).is_err());
    }

    #[test]
    fn test_validate_pdf_output() {
        assert!(Validator::validate_pdf_output(Path::new("out/docs.pdf")).is_ok());
        assert!(Validator::validate_pdf_output(Path::new("out/docs.PDF")).is_ok());
        assert!(Validator::validate_pdf_output(Path::new("out/docs.html")).is_err());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(Validator::validate_base_url("https://generativelanguage.googleapis.com").is_ok());
        assert!(Validator::validate_base_url("http://127.0.0.1:1234").is_ok());
        assert!(Validator::validate_base_url("https://").is_err());
        assert!(Validator::validate_base_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_truncate_text_respects_char_boundaries() {
        assert_eq!(Validator::truncate_text("short", 10), "short");
        assert_eq!(Validator::truncate_text("this is a very long text", 10), "this is a ...");
        assert_eq!(Validator::truncate_text("héllo wörld", 4), "héll...");
    }
}
