// file: src/pipeline/testgen.rs
// description: generates unit test modules for scanned python sources
// reference: orchestrates scanning, extraction, test generation and writing

use crate::ai::{AiError, DocGenerator, RetryPolicy, TextGenerator};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::exporter::{RunManifest, TestFileWriter};
use crate::models::UnitKind;
use crate::pipeline::cancel::CancelFlag;
use crate::pipeline::orchestrator::{Stage, extract_units, scan_sources, stats_counts};
use crate::pipeline::processor::Extraction;
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::renderer::{SourceTests, TestFile, TestSuiteRenderer, UnitTests};
use crate::repository::FrameworkClassifier;
use crate::utils::telemetry::RunTimer;
use futures::stream::{self, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct TestReport {
    pub written: Vec<PathBuf>,
    pub manifest_path: Option<PathBuf>,
    pub stats: PipelineStats,
}

pub struct TestPipeline {
    config: Config,
    generator: Arc<DocGenerator>,
    cancel: CancelFlag,
    stage: Stage,
    progress_color: Option<bool>,
}

impl TestPipeline {
    pub fn new(config: Config, client: Arc<dyn TextGenerator>, cancel: CancelFlag) -> Self {
        let generator = DocGenerator::new(
            client,
            config.ai.clone(),
            RetryPolicy::from_config(&config.retry),
            cancel.clone(),
        );
        Self::with_generator(config, generator, cancel)
    }

    pub fn with_generator(config: Config, generator: DocGenerator, cancel: CancelFlag) -> Self {
        Self {
            config,
            generator: Arc::new(generator),
            cancel,
            stage: Stage::NotStarted,
            progress_color: None,
        }
    }

    pub fn with_progress(mut self, colored: bool) -> Self {
        self.progress_color = Some(colored);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        info!("Test generation stage: {}", stage);
        self.stage = stage;
    }

    pub async fn run(&mut self) -> Result<TestReport> {
        let mut timer = RunTimer::start("test generation run");
        let mut stats = PipelineStats::new();

        self.enter(Stage::Scanning);
        let files = scan_sources(&self.config, &self.config.tests.exclude).await?;
        stats.files_scanned = files.len();

        timer.lap(Stage::Scanning);
        self.enter(Stage::Extracting);
        let extraction = extract_units(files).await?;
        stats.files_skipped = extraction.skipped.len();
        stats.units_extracted = testable_units(&extraction).count();

        timer.lap(Stage::Extracting);
        self.enter(Stage::Generating);
        let progress = match self.progress_color {
            Some(colored) => ProgressTracker::with_color(stats.units_extracted, colored),
            None => ProgressTracker::hidden(stats.units_extracted),
        };
        let sources = match self.generate(&extraction, &progress).await {
            Ok(sources) => sources,
            Err(err) => {
                progress.abandon("Test generation aborted");
                return Err(err);
            }
        };
        stats.units_generated = progress.units_generated();
        stats.retries = progress.retries();
        stats.cancelled = self.cancel.is_cancelled();
        if stats.cancelled {
            progress.abandon("Test generation cancelled");
        } else {
            progress.finish();
        }

        timer.lap(Stage::Generating);
        self.enter(Stage::Rendering);
        let renderer = TestSuiteRenderer::new(self.config.tests.framework);
        let test_files: Vec<TestFile> = sources.iter().filter_map(|s| renderer.render(s)).collect();

        self.enter(Stage::Writing);
        let written = TestFileWriter::new(&self.config.tests.output_dir).write_all(&test_files)?;
        stats.duration = timer.finish(stats.units_generated);

        let manifest_path = if self.config.output.manifest {
            let mut manifest = RunManifest::new("tests", &self.config.ai.model, &self.config.source.directories);
            manifest.counts = stats_counts(&stats);
            manifest.cancelled = stats.cancelled;
            for path in &written {
                manifest.add_artifact(path);
            }
            Some(manifest.write_to(&self.config.tests.output_dir)?)
        } else {
            None
        };

        self.enter(Stage::Done);
        Ok(TestReport {
            written,
            manifest_path,
            stats,
        })
    }

    /// Generates tests for every class, function and method, grouped back
    /// into their source files in scan order.
    async fn generate(&self, extraction: &Extraction, progress: &ProgressTracker) -> Result<Vec<SourceTests>> {
        let framework = self.config.tests.framework;
        let classifier = FrameworkClassifier::new();
        let concurrency = self.config.ai.concurrency.max(1);

        let mut sources: Vec<SourceTests> = extraction
            .files
            .iter()
            .map(|processed| SourceTests {
                relative_path: processed.file.relative_path.clone(),
                module_path: crate::parser::module_path(&processed.file.relative_path),
                web: processed.web,
                units: Vec::new(),
            })
            .collect();

        let jobs: Vec<_> = extraction
            .files
            .iter()
            .enumerate()
            .flat_map(|(index, processed)| {
                processed
                    .units
                    .iter()
                    .filter(|u| u.kind != UnitKind::Module)
                    .map(move |unit| (index, processed.web, unit.clone()))
            })
            .collect();

        info!(
            "Generating {} tests for {} units (concurrency {})",
            framework.as_str(),
            jobs.len(),
            concurrency
        );

        let mut results = stream::iter(jobs)
            .map(|(index, web, unit)| {
                let generator = self.generator.clone();
                let route = classifier.route_info(&unit);
                async move {
                    let result = generator
                        .generate_tests(&unit, framework, web, route.as_ref())
                        .await;
                    (index, unit, result)
                }
            })
            .buffered(concurrency);

        while let Some((index, unit, result)) = results.next().await {
            match result {
                Ok(attempted) => {
                    progress.record_unit(&unit.qualified_name, attempted.attempts);
                    sources[index].units.push(UnitTests {
                        unit,
                        code: attempted.value,
                    });
                }
                Err(AiError::Cancelled) => break,
                Err(err) if self.cancel.is_cancelled() => {
                    warn!("Dropping in-flight request after cancellation: {}", err);
                    break;
                }
                Err(err) => {
                    error!("Test generation failed permanently: {}", err);
                    return Err(PipelineError::Ai(err));
                }
            }
        }

        Ok(sources)
    }
}

fn testable_units(extraction: &Extraction) -> impl Iterator<Item = &crate::models::CodeUnit> {
    extraction.units().filter(|u| u.kind != UnitKind::Module)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::generator::testing::{EchoGenerator, fast_policy};
    use crate::config::TestFramework;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn config_for(source: &Path, tests_dir: &Path, framework: TestFramework) -> Config {
        let mut config = Config::default_config();
        config.source.directories = vec![source.to_path_buf()];
        config.tests.output_dir = tests_dir.to_path_buf();
        config.tests.framework = framework;
        config
    }

    fn pipeline(config: Config, client: Arc<EchoGenerator>) -> TestPipeline {
        let cancel = CancelFlag::new();
        let generator = DocGenerator::new(client, config.ai.clone(), fast_policy(), cancel.clone());
        TestPipeline::with_generator(config, generator, cancel)
    }

    #[tokio::test]
    async fn test_pytest_files_mirror_sources() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("pkg")).unwrap();
        fs::write(src.path().join("pkg/calc.py"), "def add(a, b):\n    return a + b\n").unwrap();
        fs::write(src.path().join("notes.py"), "\"\"\"Only a docstring.\"\"\"\n").unwrap();
        fs::create_dir_all(src.path().join("tests")).unwrap();
        fs::write(src.path().join("tests/old_test.py"), "def test_x():\n    pass\n").unwrap();

        let mut run = pipeline(
            config_for(src.path(), out.path(), TestFramework::Pytest),
            Arc::new(EchoGenerator::new()),
        );
        let report = run.run().await.unwrap();

        assert_eq!(run.stage(), Stage::Done);
        assert_eq!(report.written, vec![out.path().join("pkg/calc_test.py")]);
        let body = fs::read_to_string(&report.written[0]).unwrap();
        assert!(body.starts_with("\"\"\"Generated test cases.\"\"\"\n"));
        assert!(body.contains("from pkg.calc import *\n"));
        assert!(body.contains("# Test cases for add\ndoc for add\n"));
    }

    #[tokio::test]
    async fn test_unittest_flask_file() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(
            src.path().join("app.py"),
            "from flask import Flask\napp = Flask(__name__)\n\n@app.route('/users', methods=['POST'])\ndef create_user():\n    return {}\n",
        )
        .unwrap();

        let echo = Arc::new(EchoGenerator::new());
        let report = pipeline(config_for(src.path(), out.path(), TestFramework::Unittest), echo.clone())
            .run()
            .await
            .unwrap();

        assert_eq!(report.written, vec![out.path().join("test_app.py")]);
        let body = fs::read_to_string(&report.written[0]).unwrap();
        assert!(body.contains("from flask.testing import FlaskClient\n"));
        assert!(body.ends_with("unittest.main()\n"));

        let requests = echo.requests.lock().unwrap();
        assert!(requests[0].prompt.contains("handles POST requests to `/users`"));
    }

    #[tokio::test]
    async fn test_permanent_failure_writes_nothing() {
        let src = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        fs::write(src.path().join("calc.py"), "def add(a, b):\n    return a + b\n").unwrap();

        let quota = Arc::new(EchoGenerator::failing_with(vec![AiError::QuotaExhausted("billing".into())]));
        let err = pipeline(config_for(src.path(), out.path(), TestFramework::Pytest), quota)
            .run()
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Ai(AiError::QuotaExhausted(_))));
        assert!(!out.path().join("calc_test.py").exists());
    }
}
