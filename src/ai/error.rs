// file: src/ai/error.rs
// description: generation failure taxonomy split into transient and permanent classes
// reference: https://ai.google.dev/gemini-api/docs/troubleshooting

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying with backoff.
    Transient,
    /// Retrying cannot help; the run stops.
    Permanent,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    #[error("API key was rejected by the model service: {0}")]
    InvalidKey(String),

    #[error("API quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("Rate limited by the model service: {0}")]
    RateLimited(String),

    #[error("Model service unavailable: {0}")]
    Unavailable(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Model returned no usable text: {0}")]
    EmptyResponse(String),

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<AiError> },

    #[error("Generation cancelled")]
    Cancelled,
}

impl AiError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AiError::RateLimited(_)
            | AiError::Unavailable(_)
            | AiError::Timeout(_)
            | AiError::EmptyResponse(_) => ErrorClass::Transient,
            AiError::InvalidKey(_)
            | AiError::QuotaExhausted(_)
            | AiError::Rejected { .. }
            | AiError::RetriesExhausted { .. }
            | AiError::Cancelled => ErrorClass::Permanent,
        }
    }

    pub fn is_transient(&self) -> bool {
        self.class() == ErrorClass::Transient
    }

    /// Classifies a non-success HTTP response from the model service.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = error_message(body);
        let lowered = body.to_lowercase();

        if status == 401
            || status == 403
            || lowered.contains("api key not valid")
            || body.contains("API_KEY_INVALID")
        {
            return AiError::InvalidKey(message);
        }

        match status {
            429 if lowered.contains("exceeded your current quota") || lowered.contains("billing") => {
                AiError::QuotaExhausted(message)
            }
            429 => AiError::RateLimited(message),
            408 | 500..=599 => AiError::Unavailable(format!("status {}: {}", status, message)),
            _ => AiError::Rejected { status, message },
        }
    }
}

/// Pulls `error.message` out of a Google API error body, falling back to the
/// raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let body = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(
            AiError::from_status(400, body),
            AiError::InvalidKey("API key not valid. Please pass a valid API key.".to_string())
        );

        assert!(matches!(AiError::from_status(403, "denied"), AiError::InvalidKey(_)));
        assert!(matches!(
            AiError::from_status(429, "You exceeded your current quota, check billing"),
            AiError::QuotaExhausted(_)
        ));
        assert!(matches!(AiError::from_status(429, "slow down"), AiError::RateLimited(_)));
        assert!(matches!(AiError::from_status(503, "overloaded"), AiError::Unavailable(_)));
        assert!(matches!(
            AiError::from_status(400, "bad request"),
            AiError::Rejected { status: 400, .. }
        ));
    }

    #[test]
    fn test_error_classes() {
        assert!(AiError::RateLimited("x".into()).is_transient());
        assert!(AiError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(AiError::EmptyResponse("x".into()).is_transient());
        assert!(!AiError::QuotaExhausted("x".into()).is_transient());

        let exhausted = AiError::RetriesExhausted {
            attempts: 3,
            last: Box::new(AiError::Unavailable("x".into())),
        };
        assert_eq!(exhausted.class(), ErrorClass::Permanent);
        assert_eq!(
            exhausted.to_string(),
            "Gave up after 3 attempts: Model service unavailable: x"
        );
    }
}
