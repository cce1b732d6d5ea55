//! Error types for metric computation.

use thiserror::Error;

/// Result type for metric computation.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Errors that can occur while computing metrics.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Too few aligned observations for an estimate
    #[error("insufficient data: need at least {needed} observations, found {found}")]
    InsufficientData {
        /// Minimum required
        needed: usize,
        /// Available after alignment
        found: usize,
    },

    /// The benchmark shows no variation
    #[error("benchmark returns have zero variance")]
    DegenerateBenchmark,

    /// A required input column is absent
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// Input cannot be used
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
