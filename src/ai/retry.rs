// file: src/ai/retry.rs
// description: exponential backoff retry policy for generation calls
// reference: https://cloud.google.com/storage/docs/retry-strategy#exponential-backoff

use crate::ai::error::AiError;
use crate::config::RetryConfig;
use crate::pipeline::cancel::CancelFlag;
use crate::utils::Validator;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const WARN_MESSAGE_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
    retryable: fn(&AiError) -> bool,
}

/// A successful value and the number of attempts it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempted<T> {
    pub value: T,
    pub attempts: u32,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        multiplier: f64,
        max_backoff: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            multiplier,
            max_backoff,
            retryable: AiError::is_transient,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            config.multiplier,
            Duration::from_millis(config.max_backoff_ms),
        )
    }

    pub fn with_retryable(mut self, retryable: fn(&AiError) -> bool) -> Self {
        self.retryable = retryable;
        self
    }

    pub fn is_retryable(&self, err: &AiError) -> bool {
        (self.retryable)(err)
    }

    /// Delay after failed attempt `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let millis = self.initial_backoff.as_millis() as f64 * self.multiplier.powi(exponent);
        let capped = millis.min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Runs `op` until it succeeds, fails permanently, or attempts run out.
    /// Exhausted retryable failures surface as `RetriesExhausted`.
    pub async fn run<T, F, Fut>(&self, subject: &str, cancel: &CancelFlag, mut op: F) -> Result<Attempted<T>, AiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AiError>>,
    {
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(AiError::Cancelled);
            }

            let err = match op().await {
                Ok(value) => {
                    return Ok(Attempted {
                        value,
                        attempts: attempt,
                    });
                }
                Err(err) => err,
            };

            if !self.is_retryable(&err) {
                return Err(err);
            }

            if attempt >= self.max_attempts {
                return Err(AiError::RetriesExhausted {
                    attempts: attempt,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff_for(attempt);
            warn!(
                "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                attempt,
                self.max_attempts,
                subject,
                Validator::truncate_text(&err.to_string(), WARN_MESSAGE_CHARS),
                delay
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel.cancelled() => return Err(AiError::Cancelled),
            }

            attempt += 1;
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), 2.0, Duration::from_secs(30))
    }
}
