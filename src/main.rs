// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use autodoc::utils::logging::{Status, status_line};
use autodoc::{
    CancelFlag, CliOverrides, Config, DocPipeline, GeminiClient, GroupBy, PdfExporter, PdfOutcome,
    PipelineStats, TestFramework, TestPipeline, TextGenerator, Validator,
};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "autodoc")]
#[command(author = "cipher")]
#[command(version)]
#[command(about = "AI-assisted documentation and test generation for Python codebases", long_about = None)]
struct Cli {
    /// Configuration file (YAML, JSON or TOML); autodoc.* is discovered otherwise
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = true, action = ArgAction::Set, global = true)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ModelArgs {
    /// Google API key
    #[arg(short = 'k', long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long)]
    model: Option<String>,

    #[arg(long)]
    temperature: Option<f64>,

    #[arg(long = "max-tokens", value_name = "NUM")]
    max_tokens: Option<u32>,

    /// Maximum AI requests in flight
    #[arg(long, value_name = "NUM")]
    concurrency: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate consolidated Markdown documentation for a Python codebase
    Generate {
        #[arg(short, long, value_name = "DIR")]
        source: Option<PathBuf>,

        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long, value_enum)]
        group_by: Option<GroupBy>,

        /// Also convert the Markdown to PDF
        #[arg(long)]
        pdf: bool,

        /// Add a plain-language explanation to every entry
        #[arg(long = "non-tech")]
        non_tech: bool,

        #[arg(long, value_name = "PATTERN")]
        exclude: Vec<String>,

        /// Write autodoc-manifest.json next to the output
        #[arg(long)]
        manifest: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Generate unit test modules for a Python codebase
    Tests {
        #[arg(short, long, value_name = "DIR")]
        source: Option<PathBuf>,

        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[arg(long, value_enum)]
        framework: Option<TestFramework>,

        #[arg(long, value_name = "PATTERN")]
        exclude: Vec<String>,

        #[arg(long)]
        manifest: bool,

        #[command(flatten)]
        model: ModelArgs,
    },

    /// Convert an existing Markdown file to PDF
    MdToPdf {
        input: PathBuf,

        /// Output PDF path (defaults to the input path with a .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write the default configuration as YAML
    InitConfig {
        #[arg(short, long, default_value = "autodoc.yaml")]
        output: PathBuf,

        #[arg(long)]
        force: bool,
    },
}

impl ModelArgs {
    fn apply(self, overrides: &mut CliOverrides) {
        overrides.api_key = self.api_key;
        overrides.model = self.model;
        overrides.temperature = self.temperature;
        overrides.max_output_tokens = self.max_tokens;
        overrides.concurrency = self.concurrency;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    autodoc::utils::logging::init_logger(cli.color, cli.verbose);
    colored::control::set_override(cli.color);

    if let Commands::InitConfig { output, force } = &cli.command {
        return cmd_init_config(output, *force);
    }

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Generate {
            source,
            output,
            title,
            group_by,
            pdf,
            non_tech,
            exclude,
            manifest,
            model,
        } => {
            let mut overrides = CliOverrides {
                source,
                exclude,
                output_dir: output,
                title,
                group_by,
                pdf: pdf.then_some(true),
                non_technical: non_tech.then_some(true),
                manifest: manifest.then_some(true),
                ..Default::default()
            };
            model.apply(&mut overrides);
            config
                .apply_overrides(overrides)
                .context("Invalid command line options")?;
            cmd_generate(config, cli.color).await?;
        }
        Commands::Tests {
            source,
            output,
            framework,
            exclude,
            manifest,
            model,
        } => {
            let mut overrides = CliOverrides {
                source,
                exclude,
                tests_output_dir: output,
                framework,
                manifest: manifest.then_some(true),
                ..Default::default()
            };
            model.apply(&mut overrides);
            config
                .apply_overrides(overrides)
                .context("Invalid command line options")?;
            cmd_tests(config, cli.color).await?;
        }
        Commands::MdToPdf { input, output } => {
            cmd_md_to_pdf(&config, &input, output).await?;
        }
        Commands::InitConfig { .. } => {}
    }

    Ok(())
}

fn build_client(config: &Config) -> Result<Arc<dyn TextGenerator>> {
    let api_key = config.resolve_api_key()?;
    let client = GeminiClient::new(api_key, &config.ai.base_url, config.call_timeout())
        .context("Failed to create Gemini client")?;
    Ok(Arc::new(client))
}

/// Cancels the run on Ctrl-C; the partial output is still written.
fn watch_ctrl_c() -> CancelFlag {
    let cancel = CancelFlag::new();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing with the output generated so far");
            flag.cancel();
        }
    });
    cancel
}

async fn cmd_generate(config: Config, colored: bool) -> Result<()> {
    for dir in &config.source.directories {
        Validator::validate_directory(dir)?;
    }

    info!(
        "Documenting {} source director{} with {}",
        config.source.directories.len(),
        if config.source.directories.len() == 1 { "y" } else { "ies" },
        config.ai.model
    );

    let client = build_client(&config)?;
    let cancel = watch_ctrl_c();
    let mut pipeline = DocPipeline::new(config, client, cancel).with_progress(colored);

    let report = pipeline
        .run()
        .await
        .with_context(|| format!("Documentation generation failed during {}", pipeline.stage()))?;

    print_stats(&report.stats);
    println!(
        "{}",
        status_line(Status::Done, &format!(
            "Documentation written to {} ({} entries)",
            report.markdown_path.display(),
            report.document.entry_count()
        ))
    );

    match &report.pdf {
        Some(PdfOutcome::Written(path)) => {
            println!("{}", status_line(Status::Done, &format!("PDF written to {}", path.display())));
        }
        Some(PdfOutcome::Skipped(reason)) => {
            println!("{}", status_line(Status::Skipped, &format!("PDF skipped: {}", reason)));
        }
        None => {}
    }

    if let Some(path) = &report.manifest_path {
        println!("{}", status_line(Status::Note, &format!("Manifest written to {}", path.display())));
    }

    Ok(())
}

async fn cmd_tests(config: Config, colored: bool) -> Result<()> {
    for dir in &config.source.directories {
        Validator::validate_directory(dir)?;
    }

    let client = build_client(&config)?;
    let cancel = watch_ctrl_c();
    let mut pipeline = TestPipeline::new(config, client, cancel).with_progress(colored);

    let report = pipeline
        .run()
        .await
        .with_context(|| format!("Test generation failed during {}", pipeline.stage()))?;

    print_stats(&report.stats);
    for path in &report.written {
        println!("{}", status_line(Status::Done, &format!("Tests written to {}", path.display())));
    }
    if report.written.is_empty() {
        println!("{}", status_line(Status::Skipped, "No testable units found"));
    }

    if let Some(path) = &report.manifest_path {
        println!("{}", status_line(Status::Note, &format!("Manifest written to {}", path.display())));
    }

    Ok(())
}

async fn cmd_md_to_pdf(config: &Config, input: &Path, output: Option<PathBuf>) -> Result<()> {
    Validator::validate_markdown_input(input)?;
    let output = output.unwrap_or_else(|| input.with_extension("pdf"));
    Validator::validate_pdf_output(&output)?;

    let exporter = PdfExporter::new(&config.output.pdf_converters)?;
    let source = input.to_path_buf();
    let target = output.clone();

    let outcome = tokio::task::spawn_blocking(move || exporter.convert_file(&source, &target))
        .await
        .context("PDF conversion task failed")??;

    match outcome {
        PdfOutcome::Written(path) => {
            println!("{}", status_line(Status::Done, &format!("PDF written to {}", path.display())));
            Ok(())
        }
        PdfOutcome::Skipped(reason) => Err(anyhow::anyhow!("Could not convert {}: {}", input.display(), reason)),
    }
}

fn cmd_init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "{} already exists (use --force to overwrite)",
            output.display()
        ));
    }

    let yaml = Config::default_config()
        .to_yaml()
        .context("Failed to render default configuration")?;
    std::fs::write(output, yaml).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("{}", status_line(Status::Done, &format!("Configuration written to {}", output.display())));
    Ok(())
}

fn print_stats(stats: &PipelineStats) {
    info!(
        "Scanned {} files ({} skipped), {} units extracted, {} generated, {} retries in {:.2}s ({:.1}%, {:.2} units/sec)",
        stats.files_scanned,
        stats.files_skipped,
        stats.units_extracted,
        stats.units_generated,
        stats.retries,
        stats.duration.as_secs_f64(),
        stats.completion_rate(),
        stats.units_per_second()
    );

    if stats.cancelled {
        println!(
            "{}",
            status_line(Status::Skipped, &format!(
                "Cancelled after {} of {} units",
                stats.units_generated, stats.units_extracted
            ))
        );
    }
}
