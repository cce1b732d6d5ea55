//! Error types for sensitivity sweeps.

use crate::axis::Scenario;
use derive_more::Display;
use thiserror::Error;

/// Boxed model error, erased so one `GridError` covers every model type.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// The model call that failed during a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Step {
    /// Writing the row input slot.
    #[display("write the row input")]
    WriteRow,
    /// Writing the column input slot.
    #[display("write the column input")]
    WriteColumn,
    /// Forcing the model to recompute.
    #[display("recompute")]
    Recompute,
    /// Reading the output slot.
    #[display("read the output")]
    ReadOutput,
}

/// Errors that can occur while building axes or sweeping a model.
#[derive(Debug, Error)]
pub enum GridError {
    /// An axis was given no values.
    #[error("Axis '{0}' has no values")]
    EmptyAxis(String),

    /// An axis value is NaN or infinite.
    #[error("Axis '{axis}' value at index {index} is not finite: {value}")]
    NonFiniteAxisValue {
        /// Axis label
        axis: String,
        /// Position of the offending value
        index: usize,
        /// The offending value
        value: f64,
    },

    /// A step size that cannot generate an axis.
    #[error("Invalid axis step {step} for range {start}..={end}")]
    InvalidStep {
        /// First value
        start: f64,
        /// Last value
        end: f64,
        /// Increment
        step: f64,
    },

    /// An input or output slot does not resolve in the model.
    ///
    /// Raised before any input is mutated.
    #[error("Invalid model slot: {0}")]
    InvalidSlot(#[source] BoxError),

    /// A model call failed mid-sweep. The baseline was restored.
    #[error("Model failed to {step} at scenario {scenario}: {source}")]
    Model {
        /// Scenario being evaluated
        scenario: Scenario,
        /// Call that failed
        step: Step,
        /// Underlying model error
        #[source]
        source: BoxError,
    },

    /// The model produced no numeric output and the policy is to abort.
    #[error("Model produced no numeric output at scenario {0}")]
    MissingOutput(Scenario),

    /// Restoring the baseline inputs failed.
    ///
    /// When the sweep itself failed first, its error is kept in `sweep`.
    #[error("Failed to restore baseline inputs: {source}")]
    RestoreFailed {
        /// Underlying model error from the restore
        #[source]
        source: BoxError,
        /// The sweep error that preceded the restore, if any
        sweep: Option<Box<GridError>>,
    },
}

impl GridError {
    /// The scenario a sweep failure happened at, if there was one.
    pub fn scenario(&self) -> Option<Scenario> {
        match self {
            Self::Model { scenario, .. } | Self::MissingOutput(scenario) => Some(*scenario),
            Self::RestoreFailed {
                sweep: Some(sweep), ..
            } => sweep.scenario(),
            _ => None,
        }
    }
}
