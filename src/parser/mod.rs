// file: src/parser/mod.rs
// description: python source parsing and model output normalization exports
// reference: internal module structure

pub mod docstring;
pub mod normalizer;
pub mod patterns;
pub mod python;

pub use normalizer::ResponseNormalizer;
pub use python::{PythonExtractor, module_path};
