//! Progress bars for network batches and sensitivity sweeps.

use delft_grid::{Progress, ProgressObserver};
use delft_output::percent_label;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

const TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// A bar in the CLI's house style, ticking while work is in flight.
pub(crate) fn styled_bar(len: u64, message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(TEMPLATE)?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

/// Drives a progress bar from sweep notifications.
#[derive(Debug)]
pub(crate) struct SweepBar<'a> {
    pb: &'a ProgressBar,
}

impl<'a> SweepBar<'a> {
    pub(crate) const fn new(pb: &'a ProgressBar) -> Self {
        Self { pb }
    }
}

impl ProgressObserver for SweepBar<'_> {
    fn on_progress(&mut self, progress: Progress) {
        self.pb.set_length(progress.total as u64);
        self.pb.set_position(progress.completed as u64);
        self.pb.set_message(format!(
            "{} / {}",
            percent_label(progress.scenario.row_value),
            percent_label(progress.scenario.column_value)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delft_grid::Scenario;

    #[test]
    fn test_sweep_bar_tracks_completed() {
        let pb = ProgressBar::hidden();
        let mut observer = SweepBar::new(&pb);

        observer.on_progress(Progress {
            completed: 3,
            total: 88,
            scenario: Scenario {
                row: 0,
                column: 2,
                row_value: 0.015,
                column_value: 0.09,
            },
        });

        assert_eq!(pb.position(), 3);
        assert_eq!(pb.length(), Some(88));
        assert_eq!(pb.message(), "1.5% / 9.0%");
    }

    #[test]
    fn test_styled_bar() {
        let pb = styled_bar(4, "Fetching peers...").unwrap();
        assert_eq!(pb.length(), Some(4));
        pb.finish_and_clear();
    }
}
