// file: src/ai/mod.rs
// description: ai client adapter module exports
// reference: internal module structure

pub mod client;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod prompts;
pub mod retry;

pub use client::{GenerationRequest, TextGenerator};
pub use error::{AiError, ErrorClass};
pub use gemini::GeminiClient;
pub use generator::DocGenerator;
pub use retry::{Attempted, RetryPolicy};
