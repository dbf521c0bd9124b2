// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod ai;
pub mod config;
pub mod error;
pub mod exporter;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod renderer;
pub mod repository;
pub mod utils;

pub use ai::{AiError, DocGenerator, GeminiClient, RetryPolicy, TextGenerator};
pub use config::{CliOverrides, Config, GroupBy, TestFramework};
pub use error::{PipelineError, Result};
pub use exporter::{PdfExporter, PdfOutcome};
pub use models::{CodeUnit, DocumentationEntry, LineRange, UnitKind};
pub use parser::PythonExtractor;
pub use pipeline::{CancelFlag, DocPipeline, PipelineStats, Stage, TestPipeline};
pub use repository::{FileScanner, ScannedFile};
pub use utils::{RunTimer, Validator};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let config = Config::default_config();
        assert_eq!(config.output.group_by, GroupBy::Module);
        assert!(PythonExtractor::new().is_ok());
        assert!(!CancelFlag::new().is_cancelled());
    }
}
