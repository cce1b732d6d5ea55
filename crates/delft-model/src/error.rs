//! Error types for workbook and model operations.

use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while reading, writing or evaluating a workbook.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Malformed A1 or `Sheet!A1` reference
    #[error("Invalid cell reference: {0}")]
    InvalidReference(String),

    /// Sheet does not exist in the workbook
    #[error("Unknown sheet: {0}")]
    UnknownSheet(String),

    /// Cell does not hold a number
    #[error("Cell {slot} is not numeric")]
    NotNumeric {
        /// Slot that was read
        slot: String,
    },

    /// Assumptions that cannot produce a valuation
    #[error("Invalid assumptions: {0}")]
    InvalidAssumptions(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
