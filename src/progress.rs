//! Progress reporting for batch collection
//!
//! The collector owns exactly one [`ProgressSink`] for the lifetime of a
//! batch. It calls [`ProgressSink::start`] once with the batch length,
//! [`ProgressSink::advance`] once per collected result (never for the
//! sentinel) and [`ProgressSink::finish`] after the sentinel. None of the
//! three is called for an empty batch.

use tracing::info;

/// Sink for progress updates.
pub trait ProgressSink: Send {
    /// Total number of steps is now known.
    fn start(&mut self, total: usize);

    /// One more trial result was collected.
    fn advance(&mut self);

    /// Collection ended normally.
    fn finish(&mut self) {}
}

/// Discards all updates.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn start(&mut self, _total: usize) {}

    fn advance(&mut self) {}
}

/// Logs progress through `tracing` at a fixed number of steps per batch.
#[derive(Debug, Clone)]
pub struct TracingProgress {
    steps: usize,
    total: usize,
    completed: usize,
    every: usize,
}

impl TracingProgress {
    /// Report roughly `steps` times per batch, plus the final completion.
    ///
    /// `steps == 0` never logs.
    #[must_use]
    pub const fn new(steps: usize) -> Self {
        Self {
            steps,
            total: 0,
            completed: 0,
            every: 0,
        }
    }

    /// Results collected so far.
    #[must_use]
    pub const fn completed(&self) -> usize {
        self.completed
    }

    /// Batch length, once started.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    fn should_report(&self) -> bool {
        self.every > 0 && (self.completed % self.every == 0 || self.completed == self.total)
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new(20)
    }
}

impl ProgressSink for TracingProgress {
    fn start(&mut self, total: usize) {
        self.total = total;
        self.completed = 0;
        self.every = if self.steps == 0 {
            0
        } else {
            total.div_ceil(self.steps).max(1)
        };
    }

    #[allow(clippy::cast_precision_loss)]
    fn advance(&mut self) {
        self.completed += 1;
        if self.should_report() {
            let percent = self.completed as f64 * 100.0 / self.total.max(1) as f64;
            info!(
                target: "trial_conductor::progress",
                completed = self.completed,
                total = self.total,
                percent = %format!("{percent:.1}"),
                "trials completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_progress_counts() {
        let mut progress = TracingProgress::new(4);
        progress.start(10);
        for _ in 0..10 {
            progress.advance();
        }
        assert_eq!(progress.completed(), 10);
        assert_eq!(progress.total(), 10);
    }

    #[test]
    fn test_report_interval() {
        let mut progress = TracingProgress::new(4);
        progress.start(10);
        assert_eq!(progress.every, 3);

        let mut reports = 0;
        for _ in 0..10 {
            progress.advance();
            if progress.should_report() {
                reports += 1;
            }
        }
        // 3, 6, 9 and the final 10
        assert_eq!(reports, 4);
    }

    #[test]
    fn test_zero_steps_never_reports() {
        let mut progress = TracingProgress::new(0);
        progress.start(5);
        for _ in 0..5 {
            progress.advance();
            assert!(!progress.should_report());
        }
    }

    #[test]
    fn test_more_steps_than_trials() {
        let mut progress = TracingProgress::new(100);
        progress.start(3);
        assert_eq!(progress.every, 1);
    }

    #[test]
    fn test_silent_progress_is_inert() {
        let mut progress = SilentProgress;
        progress.start(3);
        progress.advance();
        progress.finish();
    }
}
