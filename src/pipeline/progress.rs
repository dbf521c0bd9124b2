// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for generation runs
// reference: uses indicatif for progress bars and tracks generation metrics

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub files_scanned: usize,
    pub files_skipped: usize,
    pub units_extracted: usize,
    pub units_generated: usize,
    pub retries: usize,
    pub cancelled: bool,
    pub duration: Duration,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn units_per_second(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.units_generated as f64 / secs
    }

    /// Share of extracted units that received generated text, in percent.
    pub fn completion_rate(&self) -> f64 {
        if self.units_extracted == 0 {
            return 100.0;
        }
        (self.units_generated as f64 / self.units_extracted as f64) * 100.0
    }
}

pub struct ProgressTracker {
    main_bar: ProgressBar,
    detail_bar: ProgressBar,
    units_generated: AtomicUsize,
    retries: AtomicUsize,
}

impl ProgressTracker {
    pub fn with_color(total_units: usize, colored: bool) -> Self {
        let multi_progress = MultiProgress::new();
        let main_bar = create_progress_bar(&multi_progress, total_units as u64, colored);
        let detail_bar = create_detail_bar(&multi_progress);
        Self::from_bars(main_bar, detail_bar)
    }

    /// Tracker that draws nothing, for library callers and tests.
    pub fn hidden(total_units: usize) -> Self {
        let main_bar = ProgressBar::with_draw_target(Some(total_units as u64), ProgressDrawTarget::hidden());
        let detail_bar = ProgressBar::hidden();
        Self::from_bars(main_bar, detail_bar)
    }

    fn from_bars(main_bar: ProgressBar, detail_bar: ProgressBar) -> Self {
        Self {
            main_bar,
            detail_bar,
            units_generated: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
        }
    }

    /// Records one finished unit that took `attempts` requests.
    pub fn record_unit(&self, subject: &str, attempts: u32) {
        self.units_generated.fetch_add(1, Ordering::SeqCst);
        let retried = attempts.saturating_sub(1) as usize;
        if retried > 0 {
            self.retries.fetch_add(retried, Ordering::SeqCst);
        }
        self.main_bar.inc(1);
        self.detail_bar.set_message(format!(
            "Last: {} | Retries: {}",
            subject,
            self.retries.load(Ordering::SeqCst)
        ));
    }

    pub fn units_generated(&self) -> usize {
        self.units_generated.load(Ordering::SeqCst)
    }

    pub fn retries(&self) -> usize {
        self.retries.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.main_bar.finish_with_message("Generation complete");
        self.detail_bar.finish_and_clear();
    }

    pub fn abandon(&self, message: &'static str) {
        self.main_bar.abandon_with_message(message);
        self.detail_bar.finish_and_clear();
    }
}

fn create_progress_bar(multi_progress: &MultiProgress, total: u64, colored: bool) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(total));
    let style = if colored {
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} units ({eta}) {msg}")
            .expect("Failed to create progress bar template")
            .progress_chars("█▓▒░")
    } else {
        ProgressStyle::default_bar()
            .template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} units ({eta}) {msg}")
            .expect("Failed to create progress bar template")
            .progress_chars("=>-")
    };
    bar.set_style(style);
    bar
}

fn create_detail_bar(multi_progress: &MultiProgress) -> ProgressBar {
    let bar = multi_progress.add(ProgressBar::new(0));
    let style = ProgressStyle::default_bar()
        .template("{msg}")
        .expect("Failed to create detail bar template");
    bar.set_style(style);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_stats_calculations() {
        let stats = PipelineStats {
            units_extracted: 8,
            units_generated: 6,
            duration: Duration::from_secs(3),
            ..PipelineStats::new()
        };

        assert_eq!(stats.units_per_second(), 2.0);
        assert_eq!(stats.completion_rate(), 75.0);
    }

    #[test]
    fn test_pipeline_stats_empty_run() {
        let stats = PipelineStats::new();
        assert_eq!(stats.units_per_second(), 0.0);
        assert_eq!(stats.completion_rate(), 100.0);
    }

    #[test]
    fn test_progress_tracker_counts_retries() {
        let tracker = ProgressTracker::hidden(3);

        tracker.record_unit("calc.add", 1);
        tracker.record_unit("calc.sub", 3);

        assert_eq!(tracker.units_generated(), 2);
        assert_eq!(tracker.retries(), 2);
        tracker.finish();
    }
}
