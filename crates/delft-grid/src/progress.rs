//! Incremental progress reporting for long sweeps.

use crate::axis::Scenario;

/// Sweep progress after a scenario completes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    /// Scenarios evaluated so far.
    pub completed: usize,
    /// Scenarios in the whole grid.
    pub total: usize,
    /// The scenario that just completed.
    pub scenario: Scenario,
}

impl Progress {
    /// Completed fraction in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }

    /// Whether this was the last scenario.
    pub const fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

/// Receives a [`Progress`] after every evaluated scenario.
pub trait ProgressObserver {
    /// Called once per completed scenario, in sweep order.
    fn on_progress(&mut self, progress: Progress);
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_progress(&mut self, _progress: Progress) {}
}

impl<F: FnMut(Progress)> ProgressObserver for F {
    fn on_progress(&mut self, progress: Progress) {
        self(progress);
    }
}
