// file: src/pipeline/orchestrator.rs
// description: coordinates scanning, extraction, generation, rendering and writing of documentation
// reference: orchestrates the asynchronous documentation workflow

use crate::ai::{AiError, DocGenerator, RetryPolicy, TextGenerator};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::exporter::{MarkdownWriter, PdfExporter, PdfOutcome, RunManifest};
use crate::models::DocumentationEntry;
use crate::pipeline::cancel::CancelFlag;
use crate::pipeline::processor::{Extraction, FileProcessor};
use crate::pipeline::progress::{PipelineStats, ProgressTracker};
use crate::renderer::{DocumentRenderer, RenderedDocument};
use crate::repository::{FileScanner, ScannedFile};
use crate::utils::telemetry::RunTimer;
use futures::stream::{self, StreamExt};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    NotStarted,
    Scanning,
    Extracting,
    Generating,
    Rendering,
    Writing,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::NotStarted => "not started",
            Stage::Scanning => "scanning",
            Stage::Extracting => "extracting",
            Stage::Generating => "generating",
            Stage::Rendering => "rendering",
            Stage::Writing => "writing",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub struct GenerateReport {
    pub markdown_path: PathBuf,
    pub pdf: Option<PdfOutcome>,
    pub manifest_path: Option<PathBuf>,
    pub document: RenderedDocument,
    pub stats: PipelineStats,
}

pub struct DocPipeline {
    config: Config,
    generator: Arc<DocGenerator>,
    cancel: CancelFlag,
    stage: Stage,
    progress_color: Option<bool>,
    pdf_search_path: Option<OsString>,
}

impl DocPipeline {
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
            pdf_search_path: None,
        }
    }

    /// Draws a progress bar while generating; hidden otherwise.
    pub fn with_progress(mut self, colored: bool) -> Self {
        self.progress_color = Some(colored);
        self
    }

    /// Restricts PDF converter lookup to `path` instead of `PATH`.
    pub fn with_pdf_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.pdf_search_path = Some(path.into());
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        info!("Pipeline stage: {}", stage);
        self.stage = stage;
    }

    pub async fn run(&mut self) -> Result<GenerateReport> {
        let mut timer = RunTimer::start("documentation run");
        let mut stats = PipelineStats::new();

        self.enter(Stage::Scanning);
        let files = scan_sources(&self.config, &[]).await?;
        stats.files_scanned = files.len();

        timer.lap(Stage::Scanning);
        self.enter(Stage::Extracting);
        let extraction = extract_units(files).await?;
        stats.files_skipped = extraction.skipped.len();
        stats.units_extracted = extraction.unit_count();

        timer.lap(Stage::Extracting);
        self.enter(Stage::Generating);
        let progress = self.progress_tracker(stats.units_extracted);
        let entries = match self.generate(&extraction, &progress).await {
            Ok(entries) => entries,
            Err(err) => {
                progress.abandon("Generation aborted");
                return Err(err);
            }
        };
        stats.units_generated = progress.units_generated();
        stats.retries = progress.retries();
        stats.cancelled = self.cancel.is_cancelled();
        if stats.cancelled {
            progress.abandon("Generation cancelled");
            warn!(
                "Cancelled: writing {} of {} entries generated so far",
                entries.len(),
                stats.units_extracted
            );
        } else {
            progress.finish();
        }

        timer.lap(Stage::Generating);
        self.enter(Stage::Rendering);
        let document = DocumentRenderer::new(self.config.output.group_by)
            .render(&self.config.output.index_title, entries);

        self.enter(Stage::Writing);
        let markdown_path = MarkdownWriter::new(self.config.markdown_path()).write(&document)?;

        let pdf = if self.config.output.pdf && !stats.cancelled {
            Some(self.export_pdf(&document, &markdown_path).await?)
        } else {
            None
        };

        stats.duration = timer.finish(stats.units_generated);

        let manifest_path = if self.config.output.manifest {
            let mut manifest = RunManifest::new("generate", &self.config.ai.model, &self.config.source.directories);
            manifest.counts = stats_counts(&stats);
            manifest.cancelled = stats.cancelled;
            manifest.add_artifact(&markdown_path);
            match &pdf {
                Some(PdfOutcome::Written(path)) => manifest.add_artifact(path),
                Some(PdfOutcome::Skipped(reason)) => manifest.pdf_skipped = Some(reason.clone()),
                None => {}
            }
            Some(manifest.write_to(&self.config.output.directory)?)
        } else {
            None
        };

        self.enter(Stage::Done);
        Ok(GenerateReport {
            markdown_path,
            pdf,
            manifest_path,
            document,
            stats,
        })
    }

    /// Requests documentation for every unit, at most `ai.concurrency` at a
    /// time. Results come back in unit order.
    async fn generate(&self, extraction: &Extraction, progress: &ProgressTracker) -> Result<Vec<DocumentationEntry>> {
        let non_technical = self.config.output.non_technical;
        let concurrency = self.config.ai.concurrency.max(1);
        info!(
            "Generating documentation for {} units with {} via {} (concurrency {})",
            extraction.unit_count(),
            self.config.ai.model,
            self.generator.backend(),
            concurrency
        );

        let mut results = stream::iter(extraction.units().cloned())
            .map(|unit| {
                let generator = self.generator.clone();
                async move { generator.document(&unit, non_technical).await }
            })
            .buffered(concurrency);

        let mut entries = Vec::with_capacity(extraction.unit_count());

        while let Some(result) = results.next().await {
            match result {
                Ok(attempted) => {
                    progress.record_unit(&attempted.value.unit.qualified_name, attempted.attempts);
                    entries.push(attempted.value);
                }
                Err(AiError::Cancelled) => break,
                Err(err) if self.cancel.is_cancelled() => {
                    warn!("Dropping in-flight request after cancellation: {}", err);
                    break;
                }
                Err(err) => {
                    error!("Generation failed permanently: {}", err);
                    return Err(PipelineError::Ai(err));
                }
            }
        }

        Ok(entries)
    }

    async fn export_pdf(&self, document: &RenderedDocument, markdown_path: &Path) -> Result<PdfOutcome> {
        let mut exporter = PdfExporter::new(&self.config.output.pdf_converters)?;
        if let Some(path) = &self.pdf_search_path {
            exporter = exporter.with_search_path(path.clone());
        }
        let markdown = document.to_markdown();
        let pdf_path = markdown_path.with_extension("pdf");

        tokio::task::spawn_blocking(move || exporter.convert_markdown(&markdown, &pdf_path))
            .await
            .map_err(|e| PipelineError::Pdf(format!("PDF conversion task failed: {}", e)))?
    }

    fn progress_tracker(&self, total: usize) -> ProgressTracker {
        match self.progress_color {
            Some(colored) => ProgressTracker::with_color(total, colored),
            None => ProgressTracker::hidden(total),
        }
    }
}

/// Scans every configured source directory. A missing root aborts the run.
pub(crate) async fn scan_sources(config: &Config, extra_excludes: &[String]) -> Result<Vec<ScannedFile>> {
    let source = config.source.clone();
    let extra = extra_excludes.to_vec();

    tokio::task::spawn_blocking(move || {
        let scanner = FileScanner::new(&source).with_extra_excludes(&extra);
        let mut files = Vec::new();
        for dir in &source.directories {
            files.extend(scanner.scan_directory(dir)?);
        }
        Ok::<_, PipelineError>(files)
    })
    .await
    .map_err(|e| PipelineError::Validation(format!("File scanning task failed: {}", e)))?
}

pub(crate) async fn extract_units(files: Vec<ScannedFile>) -> Result<Extraction> {
    tokio::task::spawn_blocking(move || {
        let mut processor = FileProcessor::new()?;
        processor.process_all(&files)
    })
    .await
    .map_err(|e| PipelineError::Validation(format!("Extraction task failed: {}", e)))?
}

pub(crate) fn stats_counts(stats: &PipelineStats) -> crate::exporter::RunCounts {
    crate::exporter::RunCounts {
        files_scanned: stats.files_scanned,
        files_skipped: stats.files_skipped,
        units_extracted: stats.units_extracted,
        units_generated: stats.units_generated,
        retries: stats.retries,
    }
}
