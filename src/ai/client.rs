// file: src/ai/client.rs
// description: text generation seam shared by the gemini client and test doubles
// reference: https://docs.rs/async-trait

use crate::ai::error::AiError;
use crate::config::AiConfig;
use async_trait::async_trait;

/// One prompt sent to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Name of the code unit or file the prompt is about, used in logs.
    pub subject: String,
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: String, subject: impl Into<String>, config: &AiConfig) -> Self {
        Self {
            prompt,
            subject: subject.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, AiError>;

    fn name(&self) -> &str;
}
