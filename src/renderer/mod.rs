// file: src/renderer/mod.rs
// description: documentation and test suite rendering exports
// reference: internal module structure

pub mod document;
pub mod test_suite;

pub use document::{DocumentRenderer, RenderedDocument, Section};
pub use test_suite::{SourceTests, TestFile, TestSuiteRenderer, UnitTests};
