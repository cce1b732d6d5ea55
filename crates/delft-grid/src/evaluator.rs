//! Row-major sweep of a [`SensitivityModel`] with guaranteed restoration.
//!
//! The sweep has three phases:
//!
//! 1. **Snapshot**: slots are checked and both inputs are read. A failure here
//!    aborts before anything is written.
//! 2. **Sweep**: for each row value, for each column value: write row, write
//!    column, recompute, read output. No caching; every scenario hits the model.
//! 3. **Restore**: both inputs get their snapshot values back and the model is
//!    recomputed once more. This runs on success, on error, and (best effort)
//!    while unwinding from a panic.

use crate::axis::{Axis, Scenario};
use crate::error::{BoxError, GridError, Result, Step};
use crate::matrix::ResultMatrix;
use crate::model::{Input, SensitivityModel};
use crate::progress::{Progress, ProgressObserver};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Log an info line every this many scenarios.
const PROGRESS_LOG_INTERVAL: usize = 10;

/// What to do when the model yields no numeric output for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingPolicy {
    /// Stop the sweep with [`GridError::MissingOutput`].
    #[default]
    Abort,
    /// Record `None` in the matrix and carry on.
    Mark,
}

/// Input values captured before a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineSnapshot {
    /// Original row input.
    pub row: f64,
    /// Original column input.
    pub column: f64,
}

impl BaselineSnapshot {
    /// Read both inputs from `model`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidSlot`] if either read fails.
    pub fn capture<M: SensitivityModel + ?Sized>(model: &M) -> Result<Self> {
        let row = model.read_input(Input::Row).map_err(invalid_slot)?;
        let column = model.read_input(Input::Column).map_err(invalid_slot)?;
        Ok(Self { row, column })
    }

    /// Write both inputs back and recompute.
    ///
    /// Every step is attempted even if an earlier one fails; the first error
    /// is returned.
    pub fn restore<M: SensitivityModel + ?Sized>(
        &self,
        model: &mut M,
    ) -> std::result::Result<(), M::Error> {
        let row = model.write_input(Input::Row, self.row);
        let column = model.write_input(Input::Column, self.column);
        let recompute = model.recompute();
        row.and(column).and(recompute)
    }
}

fn invalid_slot<E: std::error::Error + Send + Sync + 'static>(e: E) -> GridError {
    GridError::InvalidSlot(Box::new(e))
}

/// Holds the model for the duration of a sweep and restores it on exit.
///
/// Call [`finish`](Self::finish) to restore and observe the outcome. If the
/// guard is dropped without it, restoration still runs and failures are
/// logged.
struct SweepGuard<'m, M: SensitivityModel + ?Sized> {
    model: &'m mut M,
    baseline: BaselineSnapshot,
    armed: bool,
}

impl<'m, M: SensitivityModel + ?Sized> SweepGuard<'m, M> {
    fn capture(model: &'m mut M) -> Result<Self> {
        let baseline = BaselineSnapshot::capture(&*model)?;
        tracing::debug!(
            row = baseline.row,
            column = baseline.column,
            "captured baseline inputs"
        );
        Ok(Self {
            model,
            baseline,
            armed: true,
        })
    }

    fn model(&mut self) -> &mut M {
        &mut *self.model
    }

    fn finish(mut self) -> std::result::Result<(), M::Error> {
        self.armed = false;
        self.baseline.restore(&mut *self.model)
    }
}

impl<M: SensitivityModel + ?Sized> Drop for SweepGuard<'_, M> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = self.baseline.restore(&mut *self.model) {
            tracing::error!(error = %e, "failed to restore baseline inputs after an aborted sweep");
        }
    }
}

/// Sweeps a model across the Cartesian product of two axes.
#[derive(Debug, Clone)]
pub struct Evaluator {
    rows: Axis,
    columns: Axis,
    missing: MissingPolicy,
}

impl Evaluator {
    /// Create an evaluator for `rows × columns`.
    pub const fn new(rows: Axis, columns: Axis) -> Self {
        Self {
            rows,
            columns,
            missing: MissingPolicy::Abort,
        }
    }

    /// Set the policy for scenarios without a numeric output.
    pub const fn missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }

    /// Row axis.
    pub const fn rows(&self) -> &Axis {
        &self.rows
    }

    /// Column axis.
    pub const fn columns(&self) -> &Axis {
        &self.columns
    }

    /// Number of scenarios in the grid.
    pub const fn total(&self) -> usize {
        self.rows.len() * self.columns.len()
    }

    /// Run the sweep.
    ///
    /// On return, whether `Ok` or `Err`, the model's inputs hold their
    /// pre-run values and the model has been recomputed from them. The only
    /// exception is a snapshot failure, which happens before any write.
    ///
    /// # Errors
    ///
    /// - [`GridError::InvalidSlot`] if a slot does not resolve (nothing is written)
    /// - [`GridError::Model`] if a model call fails mid-sweep
    /// - [`GridError::MissingOutput`] if an output is missing under [`MissingPolicy::Abort`]
    /// - [`GridError::RestoreFailed`] if restoring the baseline fails
    pub fn run<M, O>(&self, model: &mut M, observer: &mut O) -> Result<ResultMatrix>
    where
        M: SensitivityModel + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        model.check_slots().map_err(invalid_slot)?;

        let mut guard = SweepGuard::capture(model)?;
        let swept = self.sweep(guard.model(), observer);
        let restored = guard.finish();

        match (swept, restored) {
            (Ok(cells), Ok(())) => {
                tracing::info!(
                    scenarios = self.total(),
                    "sweep complete, baseline restored"
                );
                Ok(ResultMatrix::new(
                    self.rows.clone(),
                    self.columns.clone(),
                    cells,
                ))
            }
            (Err(e), Ok(())) => {
                tracing::warn!(error = %e, "sweep aborted, baseline restored");
                Err(e)
            }
            (swept, Err(restore)) => Err(GridError::RestoreFailed {
                source: Box::new(restore),
                sweep: swept.err().map(Box::new),
            }),
        }
    }

    fn sweep<M, O>(&self, model: &mut M, observer: &mut O) -> Result<Array2<Option<f64>>>
    where
        M: SensitivityModel + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        let total = self.total();
        let mut cells = Array2::from_elem((self.rows.len(), self.columns.len()), None);
        let mut completed = 0;

        for (row, row_value) in self.rows.iter().enumerate() {
            let mut row_results = Vec::with_capacity(self.columns.len());

            for (column, column_value) in self.columns.iter().enumerate() {
                let scenario = Scenario {
                    row,
                    column,
                    row_value,
                    column_value,
                };
                let output = self.evaluate_scenario(model, scenario)?;
                row_results.push(output);

                completed += 1;
                tracing::debug!(%scenario, ?output, completed, total, "scenario evaluated");
                if completed % PROGRESS_LOG_INTERVAL == 0 {
                    tracing::info!("progress: {completed}/{total}");
                }
                observer.on_progress(Progress {
                    completed,
                    total,
                    scenario,
                });
            }

            for (column, output) in row_results.into_iter().enumerate() {
                cells[(row, column)] = output;
            }
        }

        Ok(cells)
    }

    fn evaluate_scenario<M>(&self, model: &mut M, scenario: Scenario) -> Result<Option<f64>>
    where
        M: SensitivityModel + ?Sized,
    {
        let fail = |step: Step| {
            move |e: M::Error| GridError::Model {
                scenario,
                step,
                source: Box::new(e) as BoxError,
            }
        };

        model
            .write_input(Input::Row, scenario.row_value)
            .map_err(fail(Step::WriteRow))?;
        model
            .write_input(Input::Column, scenario.column_value)
            .map_err(fail(Step::WriteColumn))?;
        model.recompute().map_err(fail(Step::Recompute))?;
        let output = model.read_output().map_err(fail(Step::ReadOutput))?;

        match output.filter(|v| v.is_finite()) {
            Some(value) => Ok(Some(value)),
            None => match self.missing {
                MissingPolicy::Abort => Err(GridError::MissingOutput(scenario)),
                MissingPolicy::Mark => {
                    tracing::warn!(%scenario, "no numeric output, marking cell as missing");
                    Ok(None)
                }
            },
        }
    }
}

/// Sweep `model` over `rows × columns` with the default [`MissingPolicy`].
///
/// # Errors
///
/// See [`Evaluator::run`].
///
/// # Examples
///
/// ```
/// use delft_grid::{Axis, Input, NoProgress, SensitivityModel, evaluate};
///
/// #[derive(Debug, Default)]
/// struct Sum { a: f64, b: f64, out: f64 }
///
/// impl SensitivityModel for Sum {
///     type Error = std::io::Error;
///     fn read_input(&self, input: Input) -> Result<f64, Self::Error> {
///         Ok(match input { Input::Row => self.a, Input::Column => self.b })
///     }
///     fn write_input(&mut self, input: Input, value: f64) -> Result<(), Self::Error> {
///         match input { Input::Row => self.a = value, Input::Column => self.b = value }
///         Ok(())
///     }
///     fn recompute(&mut self) -> Result<(), Self::Error> {
///         self.out = self.a + self.b;
///         Ok(())
///     }
///     fn read_output(&self) -> Result<Option<f64>, Self::Error> {
///         Ok(Some(self.out))
///     }
/// }
///
/// let mut model = Sum::default();
/// let rows = Axis::new("a", vec![1.0, 2.0]).unwrap();
/// let cols = Axis::new("b", vec![10.0, 20.0]).unwrap();
/// let matrix = evaluate(rows, cols, &mut model, &mut NoProgress).unwrap();
/// assert_eq!(matrix.get(1, 0), Some(12.0));
/// assert_eq!(model.out, 0.0);
/// ```
pub fn evaluate<M, O>(
    rows: Axis,
    columns: Axis,
    model: &mut M,
    observer: &mut O,
) -> Result<ResultMatrix>
where
    M: SensitivityModel + ?Sized,
    O: ProgressObserver + ?Sized,
{
    Evaluator::new(rows, columns).run(model, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use approx::assert_relative_eq;
    use std::fmt;

    #[derive(Debug)]
    struct Unreachable;

    impl fmt::Display for Unreachable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "model unreachable")
        }
    }

    impl std::error::Error for Unreachable {}

    /// Output is `row - column`, or NaN whenever the column exceeds the row.
    #[derive(Debug)]
    struct Spread {
        row: f64,
        column: f64,
        out: f64,
        row_writes: usize,
        fail_row_writes: Vec<usize>,
    }

    impl Spread {
        fn new() -> Self {
            Self {
                row: 0.09,
                column: 0.02,
                out: 0.0,
                row_writes: 0,
                fail_row_writes: Vec::new(),
            }
        }
    }

    impl SensitivityModel for Spread {
        type Error = Unreachable;

        fn read_input(&self, input: Input) -> std::result::Result<f64, Self::Error> {
            Ok(match input {
                Input::Row => self.row,
                Input::Column => self.column,
            })
        }

        fn write_input(&mut self, input: Input, value: f64) -> std::result::Result<(), Self::Error> {
            match input {
                Input::Row => {
                    self.row_writes += 1;
                    if self.fail_row_writes.contains(&self.row_writes) {
                        return Err(Unreachable);
                    }
                    self.row = value;
                }
                Input::Column => self.column = value,
            }
            Ok(())
        }

        fn recompute(&mut self) -> std::result::Result<(), Self::Error> {
            self.out = if self.column > self.row {
                f64::NAN
            } else {
                self.row - self.column
            };
            Ok(())
        }

        fn read_output(&self) -> std::result::Result<Option<f64>, Self::Error> {
            Ok(Some(self.out))
        }
    }

    fn axes() -> (Axis, Axis) {
        (
            Axis::new("row", vec![0.02, 0.05]).unwrap(),
            Axis::new("column", vec![0.01, 0.03]).unwrap(),
        )
    }

    #[test]
    fn test_nan_output_aborts_by_default() {
        let (rows, cols) = axes();
        let mut model = Spread::new();
        let err = evaluate(rows, cols, &mut model, &mut NoProgress).unwrap_err();
        match err {
            GridError::MissingOutput(s) => assert_eq!((s.row, s.column), (0, 1)),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(model.row, 0.09);
        assert_eq!(model.column, 0.02);
    }

    #[test]
    fn test_nan_output_marked() {
        let (rows, cols) = axes();
        let mut model = Spread::new();
        let matrix = Evaluator::new(rows, cols)
            .missing_policy(MissingPolicy::Mark)
            .run(&mut model, &mut NoProgress)
            .unwrap();
        assert_eq!(matrix.get(0, 1), None);
        assert_eq!(matrix.missing_count(), 1);
        assert!(matrix.get(1, 1).is_some());
    }

    #[test]
    fn test_restore_failure_after_clean_sweep() {
        let (rows, cols) = axes();
        let mut model = Spread::new();
        // Four row writes during the sweep, the fifth is the restore.
        model.fail_row_writes = vec![5];

        let err = Evaluator::new(rows, cols)
            .missing_policy(MissingPolicy::Mark)
            .run(&mut model, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, GridError::RestoreFailed { sweep: None, .. }));
    }

    #[test]
    fn test_mid_sweep_failure_restores() {
        let (rows, cols) = axes();
        let mut model = Spread::new();
        model.fail_row_writes = vec![3];

        let err = Evaluator::new(rows, cols)
            .missing_policy(MissingPolicy::Mark)
            .run(&mut model, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(
            err,
            GridError::Model {
                step: Step::WriteRow,
                ..
            }
        ));
        assert_eq!(err.scenario().map(|s| (s.row, s.column)), Some((1, 0)));
        assert_eq!(model.row, 0.09);
        assert_eq!(model.column, 0.02);
    }

    #[test]
    fn test_restore_failure_keeps_sweep_error() {
        let (rows, cols) = axes();
        let mut model = Spread::new();
        model.fail_row_writes = vec![1, 2];

        let err = evaluate(rows, cols, &mut model, &mut NoProgress).unwrap_err();
        match err {
            GridError::RestoreFailed {
                sweep: Some(sweep), ..
            } => assert!(matches!(*sweep, GridError::Model { .. })),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_slot_reported_before_writes() {
        #[derive(Debug)]
        struct NoSlots(usize);

        impl SensitivityModel for NoSlots {
            type Error = Unreachable;
            fn check_slots(&self) -> std::result::Result<(), Self::Error> {
                Err(Unreachable)
            }
            fn read_input(&self, _input: Input) -> std::result::Result<f64, Self::Error> {
                Ok(0.0)
            }
            fn write_input(
                &mut self,
                _input: Input,
                _value: f64,
            ) -> std::result::Result<(), Self::Error> {
                self.0 += 1;
                Ok(())
            }
            fn recompute(&mut self) -> std::result::Result<(), Self::Error> {
                Ok(())
            }
            fn read_output(&self) -> std::result::Result<Option<f64>, Self::Error> {
                Ok(Some(0.0))
            }
        }

        let (rows, cols) = axes();
        let mut model = NoSlots(0);
        let err = evaluate(rows, cols, &mut model, &mut NoProgress).unwrap_err();
        assert!(matches!(err, GridError::InvalidSlot(_)));
        assert_eq!(model.0, 0);
    }

    #[test]
    fn test_baseline_snapshot_roundtrip() {
        let mut model = Spread::new();
        let snapshot = BaselineSnapshot::capture(&model).unwrap();
        model.row = 1.0;
        model.column = 2.0;
        snapshot.restore(&mut model).unwrap();
        assert_eq!(
            snapshot,
            BaselineSnapshot {
                row: 0.09,
                column: 0.02
            }
        );
        assert_eq!(model.row, 0.09);
        assert_relative_eq!(model.out, 0.07, epsilon = 1e-12);
    }
}
