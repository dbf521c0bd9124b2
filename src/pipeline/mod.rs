// file: src/pipeline/mod.rs
// description: pipeline module exports and public api
// reference: pipeline orchestration

pub mod cancel;
mod orchestrator;
mod processor;
mod progress;
mod testgen;

pub use cancel::CancelFlag;
pub use orchestrator::{DocPipeline, GenerateReport, Stage};
pub use processor::{Extraction, FileProcessor, ProcessedFile};
pub use progress::{PipelineStats, ProgressTracker};
pub use testgen::{TestPipeline, TestReport};
