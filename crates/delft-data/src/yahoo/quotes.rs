//! Quote data fetching from Yahoo Finance.

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use yahoo_finance_api as yahoo;

/// Interval string Yahoo uses for month-end bars.
const MONTHLY: &str = "1mo";

/// Settings for [`YahooQuoteProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Pause after each request, in milliseconds.
    pub rate_limit_delay_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            rate_limit_delay_ms: 1000,
        }
    }
}

/// Yahoo Finance quote provider with rate limiting.
pub struct YahooQuoteProvider {
    provider: yahoo::YahooConnector,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooQuoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooQuoteProvider")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooQuoteProvider {
    /// Create a provider with the default rate limit (1 req/sec).
    ///
    /// # Errors
    ///
    /// Returns an error if the Yahoo connector cannot be built.
    pub fn new() -> Result<Self> {
        Self::with_config(ProviderConfig::default())
    }

    /// Create a provider with custom settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the Yahoo connector cannot be built.
    pub fn with_config(config: ProviderConfig) -> Result<Self> {
        Ok(Self {
            provider: yahoo::YahooConnector::new()?,
            rate_limit_delay: Duration::from_millis(config.rate_limit_delay_ms),
        })
    }

    /// Fetch daily OHLCV data for a single symbol.
    ///
    /// # Returns
    /// A DataFrame with columns: symbol, date, open, high, low, close, volume, adjusted_close
    ///
    /// # Errors
    ///
    /// Returns an error for an empty symbol, an inverted range, a failed
    /// request, or an empty response.
    pub async fn fetch_quotes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        let (start_time, end_time) = validate(symbol, start, end)?;

        let response = self
            .provider
            .get_quote_history(symbol, start_time, end_time)
            .await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        let df = quotes_to_frame(symbol, &quotes)?
            .lazy()
            .select(&[
                col("symbol"),
                col("date"),
                col("open"),
                col("high"),
                col("low"),
                col("close"),
                col("volume"),
                col("adjusted_close"),
            ])
            .collect()?;

        sleep(self.rate_limit_delay).await;
        Ok(df)
    }

    /// Fetch month-end closes for a symbol.
    ///
    /// # Returns
    /// A DataFrame with columns: symbol, date, close, sorted by date
    ///
    /// # Errors
    ///
    /// Same conditions as [`fetch_quotes`](Self::fetch_quotes).
    pub async fn fetch_monthly_closes(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<DataFrame> {
        let (start_time, end_time) = validate(symbol, start, end)?;

        let response = self
            .provider
            .get_quote_history_interval(symbol, start_time, end_time, MONTHLY)
            .await?;
        let quotes = response
            .quotes()
            .map_err(|e| DataError::YahooApi(e.to_string()))?;

        let df = quotes_to_frame(symbol, &quotes)?
            .lazy()
            .select(&[col("symbol"), col("date"), col("close")])
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;

        tracing::debug!(symbol, rows = df.height(), "fetched monthly closes");
        sleep(self.rate_limit_delay).await;
        Ok(df)
    }

    /// Most recent close for a symbol.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty symbol or a failed request.
    pub async fn latest_close(&self, symbol: &str) -> Result<f64> {
        if symbol.is_empty() {
            return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
        }

        let response = self.provider.get_latest_quotes(symbol, "1d").await?;
        let quote = response.last_quote().map_err(|_| DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "No recent quote returned from Yahoo Finance".to_string(),
        })?;

        sleep(self.rate_limit_delay).await;
        Ok(quote.close)
    }
}

fn validate(
    symbol: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(time::OffsetDateTime, time::OffsetDateTime)> {
    if start > end {
        return Err(DataError::InvalidDateRange {
            start: start.to_rfc3339(),
            end: end.to_rfc3339(),
        });
    }
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }

    let start_time = time::OffsetDateTime::from_unix_timestamp(start.timestamp())
        .map_err(|e| DataError::TimeConversion(e.to_string()))?;
    let end_time = time::OffsetDateTime::from_unix_timestamp(end.timestamp())
        .map_err(|e| DataError::TimeConversion(e.to_string()))?;
    Ok((start_time, end_time))
}

/// Build a frame with a `date` column from Yahoo bars.
fn quotes_to_frame(symbol: &str, quotes: &[yahoo::Quote]) -> Result<DataFrame> {
    if quotes.is_empty() {
        return Err(DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "No data returned from Yahoo Finance".to_string(),
        });
    }

    let dates: Vec<i64> = quotes.iter().map(|q| q.timestamp).collect();
    let opens: Vec<f64> = quotes.iter().map(|q| q.open).collect();
    let highs: Vec<f64> = quotes.iter().map(|q| q.high).collect();
    let lows: Vec<f64> = quotes.iter().map(|q| q.low).collect();
    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let volumes: Vec<u64> = quotes.iter().map(|q| q.volume).collect();
    let adj_closes: Vec<f64> = quotes.iter().map(|q| q.adjclose).collect();

    let df = DataFrame::new(vec![
        Series::new("symbol".into(), vec![symbol; quotes.len()]).into(),
        Series::new("timestamp".into(), dates).into(),
        Series::new("open".into(), opens).into(),
        Series::new("high".into(), highs).into(),
        Series::new("low".into(), lows).into(),
        Series::new("close".into(), closes).into(),
        Series::new("volume".into(), volumes).into(),
        Series::new("adjusted_close".into(), adj_closes).into(),
    ])?;

    Ok(df
        .lazy()
        .with_column(
            (col("timestamp") * lit(1_000_000_000))
                .cast(DataType::Datetime(TimeUnit::Nanoseconds, None))
                .cast(DataType::Date)
                .alias("date"),
        )
        .collect()?)
}
