// file: src/exporter/mod.rs
// description: output writers for markdown, html, pdf, test files and run manifests
// reference: internal module structure

pub mod html;
pub mod manifest;
pub mod markdown;
pub mod pdf;
pub mod test_files;

pub use html::HtmlRenderer;
pub use manifest::{MANIFEST_FILE_NAME, RunCounts, RunManifest};
pub use markdown::{MarkdownWriter, write_atomic};
pub use pdf::{Converter, PdfExporter, PdfOutcome};
pub use test_files::TestFileWriter;
