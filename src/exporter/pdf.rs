// file: src/exporter/pdf.rs
// description: pdf export through the first available external html converter
// reference: wkhtmltopdf, weasyprint and headless chromium command lines

use crate::error::{PipelineError, Result};
use crate::exporter::html::HtmlRenderer;
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::{debug, info, warn};

const EDGE_PATHS: [&str; 2] = [
    r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
    r"C:\Program Files\Microsoft\Edge\Application\msedge.exe",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Wkhtmltopdf,
    Weasyprint,
    ChromiumBrowser,
    Chromium,
    GoogleChrome,
    Textutil,
    Edge,
}

impl Converter {
    pub const ALL: [Converter; 7] = [
        Converter::Wkhtmltopdf,
        Converter::Weasyprint,
        Converter::ChromiumBrowser,
        Converter::Chromium,
        Converter::GoogleChrome,
        Converter::Textutil,
        Converter::Edge,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Converter::Wkhtmltopdf => "wkhtmltopdf",
            Converter::Weasyprint => "weasyprint",
            Converter::ChromiumBrowser => "chromium-browser",
            Converter::Chromium => "chromium",
            Converter::GoogleChrome => "google-chrome",
            Converter::Textutil => "textutil",
            Converter::Edge => "edge",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Preference order for the running platform.
    pub fn platform_defaults() -> Vec<Self> {
        if cfg!(target_os = "windows") {
            vec![Converter::Edge, Converter::Wkhtmltopdf]
        } else if cfg!(target_os = "macos") {
            vec![Converter::Wkhtmltopdf, Converter::Weasyprint, Converter::Textutil]
        } else {
            vec![
                Converter::Wkhtmltopdf,
                Converter::Weasyprint,
                Converter::ChromiumBrowser,
                Converter::Chromium,
                Converter::GoogleChrome,
            ]
        }
    }

    fn locate(&self, search_path: Option<&OsString>) -> Option<PathBuf> {
        match self {
            Converter::Edge => EDGE_PATHS
                .iter()
                .map(PathBuf::from)
                .find(|p| p.is_file())
                .or_else(|| find_program("msedge", search_path)),
            Converter::Textutil => {
                find_program("cupsfilter", search_path)?;
                find_program("textutil", search_path)
            }
            other => find_program(other.name(), search_path),
        }
    }

    fn run(&self, program: &Path, html: &Path, pdf: &Path, search_path: Option<&OsString>) -> std::result::Result<(), String> {
        match self {
            Converter::Wkhtmltopdf => run_quiet(Command::new(program).arg("--quiet").arg(html).arg(pdf)),
            Converter::Weasyprint => run_quiet(Command::new(program).arg(html).arg(pdf)),
            Converter::ChromiumBrowser | Converter::Chromium | Converter::GoogleChrome | Converter::Edge => {
                let mut print_arg = OsString::from("--print-to-pdf=");
                print_arg.push(pdf.as_os_str());
                run_quiet(
                    Command::new(program)
                        .arg("--headless")
                        .arg("--disable-gpu")
                        .arg(print_arg)
                        .arg(file_url(html)),
                )
            }
            Converter::Textutil => {
                let rtf = html.with_extension("rtf");
                run_quiet(
                    Command::new(program)
                        .args(["-convert", "rtf", "-output"])
                        .arg(&rtf)
                        .arg(html),
                )?;

                let cupsfilter = find_program("cupsfilter", search_path)
                    .ok_or_else(|| "cupsfilter not found".to_string())?;
                let output = fs::File::create(pdf).map_err(|e| e.to_string())?;
                run_quiet(Command::new(cupsfilter).arg(&rtf).stdout(output))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfOutcome {
    Written(PathBuf),
    /// No converter produced a PDF; the reason lists what was tried.
    Skipped(String),
}

pub struct PdfExporter {
    converters: Vec<Converter>,
    html: HtmlRenderer,
    search_path: Option<OsString>,
}

impl PdfExporter {
    /// Empty `names` selects the platform defaults.
    pub fn new(names: &[String]) -> Result<Self> {
        let converters = if names.is_empty() {
            Converter::platform_defaults()
        } else {
            names
                .iter()
                .map(|name| {
                    Converter::from_name(name).ok_or_else(|| {
                        PipelineError::Config(format!("Unknown PDF converter: {}", name))
                    })
                })
                .collect::<Result<Vec<_>>>()?
        };

        Ok(Self {
            converters,
            html: HtmlRenderer::new(),
            search_path: None,
        })
    }

    /// Looks converters up in `path` instead of the process `PATH`.
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn converters(&self) -> &[Converter] {
        &self.converters
    }

    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<PdfOutcome> {
        let markdown = fs::read_to_string(input).map_err(|e| PipelineError::file_operation(input, e))?;
        self.convert_markdown(&markdown, output)
    }

    /// Renders the markdown to HTML in a scratch directory and hands it to
    /// each converter in turn until one produces a non-empty PDF. Converters
    /// write into the scratch directory; only a finished PDF reaches `output`.
    pub fn convert_markdown(&self, markdown: &str, output: &Path) -> Result<PdfOutcome> {
        let scratch = TempDir::new()?;
        let html_path = scratch.path().join("document.html");
        fs::write(&html_path, self.html.render(markdown))
            .map_err(|e| PipelineError::file_operation(&html_path, e))?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
        }

        let output = absolute(output)?;
        let mut tried = Vec::new();

        for converter in &self.converters {
            let Some(program) = converter.locate(self.search_path.as_ref()) else {
                debug!("PDF converter {} not installed", converter.name());
                continue;
            };

            tried.push(converter.name());
            info!("Converting to PDF with {}", converter.name());

            let staged = scratch.path().join(format!("{}.pdf", converter.name()));
            match converter.run(&program, &html_path, &staged, self.search_path.as_ref()) {
                Ok(()) if is_non_empty(&staged) => {
                    promote(&staged, &output)?;
                    info!("PDF written to {}", output.display());
                    return Ok(PdfOutcome::Written(output));
                }
                Ok(()) => warn!("{} reported success but produced no PDF", converter.name()),
                Err(err) => warn!("{} failed: {}", converter.name(), err),
            }
        }

        let names: Vec<_> = self.converters.iter().map(|c| c.name()).collect();
        let reason = if tried.is_empty() {
            format!("no PDF converter found (install one of: {})", names.join(", "))
        } else {
            format!("every available converter failed ({})", tried.join(", "))
        };

        warn!("PDF skipped: {}", reason);
        Ok(PdfOutcome::Skipped(reason))
    }
}

fn find_program(name: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    let paths = match search_path {
        Some(path) => path.clone(),
        None => env::var_os("PATH")?,
    };

    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(name);
        if candidate.is_file() {
            return Some(candidate);
        }
        let exe = dir.join(format!("{}.exe", name));
        exe.is_file().then_some(exe)
    })
}

fn run_quiet(command: &mut Command) -> std::result::Result<(), String> {
    let output = command
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to launch: {}", e))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(format!("exited with {}: {}", output.status, stderr.trim()))
    }
}

fn file_url(path: &Path) -> String {
    let text = path.to_string_lossy().replace('\\', "/");
    if text.starts_with('/') {
        format!("file://{}", text)
    } else {
        format!("file:///{}", text)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(env::current_dir()?.join(path))
    }
}

/// Moves a finished PDF into place, copying when the scratch directory is on
/// another filesystem.
fn promote(staged: &Path, output: &Path) -> Result<()> {
    if fs::rename(staged, output).is_ok() {
        return Ok(());
    }
    fs::copy(staged, output).map_err(|e| PipelineError::file_operation(output, e))?;
    Ok(())
}

fn is_non_empty(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_converter_names_round_trip() {
        for converter in Converter::ALL {
            assert_eq!(Converter::from_name(converter.name()), Some(converter));
        }
        assert_eq!(Converter::from_name(" WeasyPrint "), Some(Converter::Weasyprint));
        assert_eq!(Converter::from_name("pandoc"), None);
    }

    #[test]
    fn test_unknown_converter_rejected() {
        let result = PdfExporter::new(&["pandoc".to_string()]);
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_override_order_kept() {
        let exporter = PdfExporter::new(&["weasyprint".to_string(), "wkhtmltopdf".to_string()]).unwrap();
        assert_eq!(exporter.converters(), &[Converter::Weasyprint, Converter::Wkhtmltopdf]);
    }

    #[test]
    fn test_no_converter_skips() {
        let temp = TempDir::new().unwrap();
        let empty_bin = temp.path().join("bin");
        fs::create_dir_all(&empty_bin).unwrap();
        let output = temp.path().join("out/docs.pdf");

        let exporter = PdfExporter::new(&["wkhtmltopdf".to_string(), "weasyprint".to_string()])
            .unwrap()
            .with_search_path(empty_bin.as_os_str());
        let outcome = exporter.convert_markdown("# Docs\n", &output).unwrap();

        match outcome {
            PdfOutcome::Skipped(reason) => assert!(reason.contains("wkhtmltopdf, weasyprint")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_converter_falls_through() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bin).unwrap();

        let broken = bin.join("wkhtmltopdf");
        fs::write(&broken, "#!/bin/sh\nexit 3\n").unwrap();
        let working = bin.join("weasyprint");
        fs::write(&working, "#!/bin/sh\nfor last; do :; done\necho '%PDF-1.4' > \"$last\"\n").unwrap();
        for script in [&broken, &working] {
            fs::set_permissions(script, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let output = temp.path().join("docs.pdf");
        let exporter = PdfExporter::new(&["wkhtmltopdf".to_string(), "weasyprint".to_string()])
            .unwrap()
            .with_search_path(bin.as_os_str());
        let outcome = exporter.convert_markdown("# Docs\n", &output).unwrap();

        assert_eq!(outcome, PdfOutcome::Written(output.clone()));
        assert!(fs::read_to_string(&output).unwrap().starts_with("%PDF"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_converter_leaves_no_partial_pdf() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("bin");
        fs::create_dir_all(&bin).unwrap();

        let partial = bin.join("wkhtmltopdf");
        fs::write(&partial, "#!/bin/sh\nfor last; do :; done\necho '%PDF-partial' > \"$last\"\nexit 1\n").unwrap();
        fs::set_permissions(&partial, fs::Permissions::from_mode(0o755)).unwrap();

        let output = temp.path().join("docs.pdf");
        let exporter = PdfExporter::new(&["wkhtmltopdf".to_string()])
            .unwrap()
            .with_search_path(bin.as_os_str());
        let outcome = exporter.convert_markdown("# Docs\n", &output).unwrap();

        match outcome {
            PdfOutcome::Skipped(reason) => assert!(reason.contains("every available converter failed")),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert!(!output.exists());
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/tmp/a.html")), "file:///tmp/a.html");
    }
}
