//! Errors raised by the market-data providers.

use thiserror::Error;

/// Result type for provider calls.
pub type Result<T> = std::result::Result<T, DataError>;

/// Failures fetching quotes, statements or peer data.
#[derive(Debug, Error)]
pub enum DataError {
    /// `FMP_API_KEY` is not set in the environment or a `.env` file
    #[error("FMP_API_KEY is not set (export it or add it to .env)")]
    MissingApiKey,

    /// Empty or malformed ticker
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Start of a quote window after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        /// Requested start
        start: String,
        /// Requested end
        end: String,
    },

    /// Yahoo Finance rejected the request or sent nothing usable
    #[error("Yahoo Finance error: {0}")]
    YahooApi(String),

    /// Financial Modeling Prep sent an error payload or status
    #[error("FMP error: {0}")]
    FmpApi(String),

    /// Provider asked us to back off (HTTP 429)
    #[error("Rate limited by provider, retry in {retry_after_ms} ms")]
    RateLimit {
        /// Suggested wait
        retry_after_ms: u64,
    },

    /// The provider answered but the data needed is absent
    #[error("No data for {symbol}: {reason}")]
    MissingData {
        /// Ticker queried
        symbol: String,
        /// What was missing
        reason: String,
    },

    /// A response could not be interpreted
    #[error("Could not parse provider response: {0}")]
    Parse(String),

    /// Timestamp outside the range chrono or time can represent
    #[error("Timestamp conversion failed: {0}")]
    TimeConversion(String),

    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON decoding failure
    #[error("JSON error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Frame construction failure
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

impl DataError {
    /// Whether retrying the same request later may succeed.
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimit { .. } | Self::Network(_))
    }
}

impl From<yahoo_finance_api::YahooError> for DataError {
    fn from(err: yahoo_finance_api::YahooError) -> Self {
        Self::YahooApi(err.to_string())
    }
}
