// file: src/repository/scanner.rs
// description: Directory walking and source file discovery with exclusion filtering
// reference: https://docs.rs/walkdir

use crate::config::SourceConfig;
use crate::error::{PipelineError, Result};
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

pub struct FileScanner {
    extension: String,
    exclude: Vec<ExcludePattern>,
    max_file_size: u64,
}

/// One compiled exclusion glob. A pattern of `n` `/`-separated segments is
/// tested against every run of `n` consecutive path components, so `venv`
/// and `test_*.py` match any component and `tests/fixtures` any sub-path.
struct ExcludePattern {
    source: String,
    pattern: glob::Pattern,
    segments: usize,
}

impl ExcludePattern {
    fn compile(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_matches('/');
        if trimmed.is_empty() {
            return None;
        }

        match glob::Pattern::new(trimmed) {
            Ok(pattern) => Some(Self {
                source: raw.to_string(),
                pattern,
                segments: trimmed.split('/').count(),
            }),
            Err(e) => {
                warn!("Invalid exclude pattern '{}': {}", raw, e);
                None
            }
        }
    }

    fn matches(&self, components: &[&str]) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        components
            .windows(self.segments)
            .any(|run| self.pattern.matches_with(&run.join("/"), options))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub size: u64,
}

impl FileScanner {
    pub fn new(config: &SourceConfig) -> Self {
        Self {
            extension: config.extension.trim_start_matches('.').to_string(),
            exclude: Vec::new(),
            max_file_size: config.max_file_size_kb.saturating_mul(1024),
        }
        .with_extra_excludes(&config.exclude)
    }

    pub fn with_extra_excludes(mut self, patterns: &[String]) -> Self {
        for raw in patterns {
            if self.exclude.iter().any(|p| &p.source == raw) {
                continue;
            }
            if let Some(pattern) = ExcludePattern::compile(raw) {
                self.exclude.push(pattern);
            }
        }
        self
    }

    /// Lists candidate source files under `root` in lexicographic path order.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        if !root.is_dir() {
            return Err(PipelineError::SourceNotFound(root.to_path_buf()));
        }

        info!("Scanning directory: {}", root.display());
        let mut files = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !self.is_excluded_entry(entry, root));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    warn!("Skipping unreadable path {}: {}", path, err);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(self.extension.as_str()) {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    warn!("Skipping {}: {}", path.display(), err);
                    continue;
                }
            };

            if self.max_file_size > 0 && size > self.max_file_size {
                debug!(
                    "Skipping large file ({} KB): {}",
                    size / 1024,
                    path.display()
                );
                continue;
            }

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path: relative_path(path, root),
                size,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        info!("Found {} .{} files", files.len(), self.extension);
        Ok(files)
    }

    fn is_excluded_entry(&self, entry: &DirEntry, root: &Path) -> bool {
        let name = entry.file_name().to_string_lossy();
        if name.starts_with('.') {
            debug!("Skipping hidden path: {}", entry.path().display());
            return true;
        }

        let relative = relative_path(entry.path(), root);
        if self.should_skip(&relative) {
            debug!("Skipping excluded path: {}", relative);
            return true;
        }

        false
    }

    /// Matches a root-relative, `/`-separated path against the exclusion list.
    fn should_skip(&self, relative: &str) -> bool {
        let components: Vec<&str> = relative.split('/').collect();
        self.exclude.iter().any(|pattern| pattern.matches(&components))
    }
}

fn relative_path(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
