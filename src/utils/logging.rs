// file: src/utils/logging.rs
// description: tracing subscriber setup and colored status lines for the cli
// reference: https://docs.rs/tracing-subscriber

use colored::*;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter directive when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "autodoc=debug,info" } else { "info" }
}

/// Installs the global subscriber. `RUST_LOG` wins over `--verbose`.
/// Calling it twice keeps the first subscriber.
pub fn init_logger(ansi: bool, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = fmt::layer()
        .with_target(verbose)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact()
        .with_ansi(ansi)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Done,
    Skipped,
    Note,
}

/// One user-facing result line, e.g. `✓ Documentation written to docs/x.md`.
pub fn status_line(status: Status, msg: &str) -> String {
    match status {
        Status::Done => format!("{} {}", "✓".green().bold(), msg.green()),
        Status::Skipped => format!("{} {}", "⚠".yellow().bold(), msg.yellow()),
        Status::Note => format!("{} {}", "ℹ".blue().bold(), msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_line_plain() {
        colored::control::set_override(false);
        assert_eq!(status_line(Status::Done, "written"), "✓ written");
        assert_eq!(status_line(Status::Skipped, "no converter"), "⚠ no converter");
        assert_eq!(status_line(Status::Note, "manifest"), "ℹ manifest");
        colored::control::unset_override();
    }

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false), "info");
        assert!(default_directive(true).contains("debug"));
    }
}
