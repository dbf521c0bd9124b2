// file: src/utils/telemetry.rs
// description: wall-clock timing of pipeline runs broken down per stage
// reference: https://docs.rs/tracing

use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Measures a whole run and the time spent between successive laps.
pub struct RunTimer {
    label: &'static str,
    started: Instant,
    lap_started: Instant,
    laps: Vec<(String, Duration)>,
}

impl RunTimer {
    pub fn start(label: &'static str) -> Self {
        debug!("Timing {}", label);
        let now = Instant::now();
        Self {
            label,
            started: now,
            lap_started: now,
            laps: Vec::new(),
        }
    }

    /// Closes the current lap under `stage` and starts the next one.
    pub fn lap(&mut self, stage: impl ToString) -> Duration {
        let now = Instant::now();
        let took = now.duration_since(self.lap_started);
        self.lap_started = now;

        let stage = stage.to_string();
        debug!("{}: {} took {:.2}s", self.label, stage, took.as_secs_f64());
        self.laps.push((stage, took));
        took
    }

    pub fn total(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs the run summary with its throughput and returns the total time.
    pub fn finish(self, units: usize) -> Duration {
        let total = self.total();
        let secs = total.as_secs_f64();
        let breakdown = self
            .laps
            .iter()
            .map(|(stage, took)| format!("{} {:.2}s", stage, took.as_secs_f64()))
            .collect::<Vec<_>>()
            .join(", ");

        info!(
            "Finished {}: {} units in {:.2}s ({:.2} units/sec) [{}]",
            self.label,
            units,
            secs,
            if secs > 0.0 { units as f64 / secs } else { 0.0 },
            breakdown
        );
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laps_partition_the_run() {
        let mut timer = RunTimer::start("test run");
        std::thread::sleep(Duration::from_millis(5));
        let scan = timer.lap("scanning");
        std::thread::sleep(Duration::from_millis(5));
        let generate = timer.lap("generating");

        assert!(scan >= Duration::from_millis(5));
        assert!(generate >= Duration::from_millis(5));
        let stages: Vec<_> = timer.laps.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(stages, vec!["scanning", "generating"]);

        let total = timer.finish(2);
        assert!(total >= scan + generate);
    }
}
