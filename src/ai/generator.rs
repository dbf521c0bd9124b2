// file: src/ai/generator.rs
// description: adapter turning code units into generated documentation and test code
// reference: retry, timeout and normalization around a TextGenerator

use crate::ai::client::{GenerationRequest, TextGenerator};
use crate::ai::error::AiError;
use crate::ai::prompts;
use crate::ai::retry::{Attempted, RetryPolicy};
use crate::config::{AiConfig, TestFramework};
use crate::models::{CodeUnit, DocumentationEntry};
use crate::parser::ResponseNormalizer;
use crate::pipeline::cancel::CancelFlag;
use crate::repository::{RouteInfo, WebFramework};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextKind {
    Documentation,
    Code,
}

pub struct DocGenerator {
    client: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
    config: AiConfig,
    timeout: Duration,
    cancel: CancelFlag,
    normalizer: ResponseNormalizer,
}

impl DocGenerator {
    pub fn new(client: Arc<dyn TextGenerator>, config: AiConfig, policy: RetryPolicy, cancel: CancelFlag) -> Self {
        Self {
            client,
            policy,
            timeout: Duration::from_secs(config.timeout_secs),
            config,
            cancel,
            normalizer: ResponseNormalizer::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(&self) -> &str {
        self.client.name()
    }

    /// Documents one unit. In non-technical mode a second request adds the
    /// plain-language explanation. `attempts` counts both requests.
    pub async fn document(&self, unit: &CodeUnit, non_technical: bool) -> Result<Attempted<DocumentationEntry>, AiError> {
        let subject = unit.qualified_name.as_str();
        debug!("Documenting {} at {}", subject, unit.location());
        let documentation = self
            .complete(prompts::documentation_prompt(unit), subject, TextKind::Documentation)
            .await?;

        let mut attempts = documentation.attempts;
        let mut entry = DocumentationEntry::new(unit.clone(), documentation.value);

        if non_technical {
            let plain = self
                .complete(prompts::plain_language_prompt(unit), subject, TextKind::Documentation)
                .await?;
            attempts += plain.attempts;
            entry = entry.with_plain_language(plain.value);
        }

        Ok(Attempted {
            value: entry,
            attempts,
        })
    }

    /// Generates test code for one unit.
    pub async fn generate_tests(
        &self,
        unit: &CodeUnit,
        framework: TestFramework,
        web: Option<WebFramework>,
        route: Option<&RouteInfo>,
    ) -> Result<Attempted<String>, AiError> {
        let prompt = prompts::test_prompt(unit, framework, web, route);
        self.complete(prompt, &unit.qualified_name, TextKind::Code).await
    }

    async fn complete(&self, prompt: String, subject: &str, kind: TextKind) -> Result<Attempted<String>, AiError> {
        let request = GenerationRequest::new(prompt, subject, &self.config);

        self.policy
            .run(subject, &self.cancel, || {
                let request = &request;
                async move {
                    let call = tokio::time::timeout(self.timeout, self.client.generate(request));
                    let raw = tokio::select! {
                        outcome = call => match outcome {
                            Ok(result) => result?,
                            Err(_) => return Err(AiError::Timeout(self.timeout)),
                        },
                        _ = self.cancel.cancelled() => return Err(AiError::Cancelled),
                    };

                    let text = match kind {
                        TextKind::Documentation => self.normalizer.normalize_documentation(&raw),
                        TextKind::Code => self.normalizer.normalize_code(&raw),
                    };

                    if text.is_empty() {
                        debug!("Empty text after normalization for {}", request.subject);
                        return Err(AiError::EmptyResponse(format!(
                            "blank output for {}",
                            request.subject
                        )));
                    }

                    Ok(text)
                }
            })
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{EchoGenerator, fast_policy};
    use super::*;
    use crate::config::Config;
    use crate::models::UnitKind;
    use crate::models::code_unit::sample_unit;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    fn generator(client: Arc<dyn TextGenerator>) -> DocGenerator {
        DocGenerator::new(client, Config::default_config().ai, fast_policy(), CancelFlag::new())
    }

    #[tokio::test]
    async fn test_document_function() {
        let echo = Arc::new(EchoGenerator::new());
        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);

        let result = generator(echo.clone()).document(&unit, false).await.unwrap();

        assert_eq!(result.value.documentation, "doc for add");
        assert_eq!(result.value.plain_language, None);
        assert_eq!(result.attempts, 1);
        assert_eq!(echo.request_count(), 1);
    }

    #[tokio::test]
    async fn test_non_technical_makes_second_request() {
        let echo = Arc::new(EchoGenerator::new());
        let unit = sample_unit(UnitKind::Class, "Account", "bank.py", 1);

        let result = generator(echo.clone()).document(&unit, true).await.unwrap();

        assert_eq!(result.value.plain_language.as_deref(), Some("doc for Account"));
        assert_eq!(echo.request_count(), 2);
        let requests = echo.requests.lock().unwrap();
        assert!(requests[1].prompt.contains("does not write code"));
    }

    #[tokio::test]
    async fn test_transient_failure_yields_same_entry() {
        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);
        let direct = generator(Arc::new(EchoGenerator::new()))
            .document(&unit, false)
            .await
            .unwrap();

        let flaky = Arc::new(EchoGenerator::failing_with(vec![AiError::RateLimited("busy".into())]));
        let retried = generator(flaky).document(&unit, false).await.unwrap();

        assert_eq!(retried.value, direct.value);
        assert_eq!(retried.attempts, 2);
    }

    #[tokio::test]
    async fn test_permanent_failure_propagates() {
        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);
        let bad_key = Arc::new(EchoGenerator::failing_with(vec![AiError::InvalidKey("nope".into())]));

        let err = generator(bad_key.clone()).document(&unit, false).await.unwrap_err();

        assert!(matches!(err, AiError::InvalidKey(_)));
        assert_eq!(bad_key.request_count(), 1);
    }

    struct BlankGenerator;

    #[async_trait]
    impl TextGenerator for BlankGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, AiError> {
            Ok("```\n\n```".to_string())
        }

        fn name(&self) -> &str {
            "blank"
        }
    }

    #[tokio::test]
    async fn test_blank_output_retried_then_exhausted() {
        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);
        let err = generator(Arc::new(BlankGenerator))
            .document(&unit, false)
            .await
            .unwrap_err();

        match err {
            AiError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert!(matches!(*last, AiError::EmptyResponse(_)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    struct SlowGenerator;

    #[async_trait]
    impl TextGenerator for SlowGenerator {
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, AiError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("late".to_string())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    #[tokio::test]
    async fn test_call_timeout_is_transient() {
        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);
        let err = generator(Arc::new(SlowGenerator))
            .with_timeout(Duration::from_millis(10))
            .document(&unit, false)
            .await
            .unwrap_err();

        match err {
            AiError::RetriesExhausted { last, .. } => assert!(matches!(*last, AiError::Timeout(_))),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_cancel_interrupts_in_flight_request() {
        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);
        let cancel = CancelFlag::new();
        let generator = DocGenerator::new(
            Arc::new(SlowGenerator),
            Config::default_config().ai,
            fast_policy(),
            cancel.clone(),
        )
        .with_timeout(Duration::from_secs(60));

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = generator.document(&unit, false).await.unwrap_err();

        assert!(matches!(err, AiError::Cancelled));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_generated_tests_strip_python_fence() {
        struct FencedGenerator;

        #[async_trait]
        impl TextGenerator for FencedGenerator {
            async fn generate(&self, _request: &GenerationRequest) -> Result<String, AiError> {
                Ok("```python\ndef test_add():\n    assert add(1, 2) == 3\n```".to_string())
            }

            fn name(&self) -> &str {
                "fenced"
            }
        }

        let unit = sample_unit(UnitKind::Function, "add", "calc.py", 1);
        let result = generator(Arc::new(FencedGenerator))
            .generate_tests(&unit, TestFramework::Pytest, None, None)
            .await
            .unwrap();

        assert_eq!(result.value, "def test_add():\n    assert add(1, 2) == 3");
    }
}
