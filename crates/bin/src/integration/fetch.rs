//! Network fetches behind the `collect`, `peers` and `market` commands.

use chrono::{DateTime, Duration, Utc};
use delft_data::{DataError, FmpClient, Period, PeerSnapshot, RawStatement, YahooQuoteProvider};
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use polars::prelude::*;

/// Peer requests in flight at once.
const PEER_CONCURRENCY: usize = 4;

/// Ten-year Treasury yield index, quoted in percent.
pub(crate) const TREASURY_SYMBOL: &str = "^TNX";

/// The three annual statements for one company, most recent first.
#[derive(Debug)]
pub(crate) struct Statements {
    pub(crate) income: Vec<RawStatement>,
    pub(crate) balance: Vec<RawStatement>,
    pub(crate) cash_flow: Vec<RawStatement>,
}

impl Statements {
    /// Periods in the income statement, which drives the table years.
    pub(crate) fn periods(&self) -> usize {
        self.income.len()
    }
}

/// Fetch income statement, balance sheet and cash flow concurrently.
pub(crate) async fn fetch_statements(
    client: &FmpClient,
    symbol: &str,
    years: u32,
) -> Result<Statements, DataError> {
    let limit = Some(years);
    let (income, balance, cash_flow) = tokio::try_join!(
        client.income_statement(symbol, Period::Annual, limit),
        client.balance_sheet(symbol, Period::Annual, limit),
        client.cash_flow(symbol, Period::Annual, limit),
    )?;

    if income.is_empty() {
        return Err(DataError::MissingData {
            symbol: symbol.to_string(),
            reason: "No income statements returned".to_string(),
        });
    }

    Ok(Statements {
        income,
        balance,
        cash_flow,
    })
}

/// Fetch snapshots for every peer, keeping input order.
///
/// A peer whose profile cannot be fetched is skipped with a warning rather
/// than failing the whole table.
pub(crate) async fn fetch_peer_snapshots(
    client: &FmpClient,
    symbols: &[&str],
    progress: Option<&ProgressBar>,
) -> Vec<PeerSnapshot> {
    let results: Vec<_> = stream::iter(symbols.iter().copied())
        .map(|symbol| async move { (symbol, client.peer_snapshot(symbol).await) })
        .buffered(PEER_CONCURRENCY)
        .inspect(|(symbol, result)| {
            if let Some(pb) = progress {
                pb.set_message(symbol.to_string());
                if let Err(e) = result {
                    pb.suspend(|| skipped(symbol, e));
                }
                pb.inc(1);
            } else if let Err(e) = result {
                skipped(symbol, e);
            }
        })
        .collect()
        .await;

    results
        .into_iter()
        .filter_map(|(_, result)| result.ok())
        .collect()
}

fn skipped(symbol: &str, error: &DataError) {
    tracing::warn!(
        %symbol,
        %error,
        transient = error.is_transient(),
        "skipping peer"
    );
}

/// `[start, end]` ending now and reaching back `years` calendar years.
pub(crate) fn lookback(years: u32, end: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (end - Duration::days(365 * i64::from(years)), end)
}

/// Monthly closes for the stock and its benchmark over the same window.
pub(crate) async fn fetch_monthly_pair(
    provider: &YahooQuoteProvider,
    symbol: &str,
    benchmark: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<(DataFrame, DataFrame), DataError> {
    let stock = provider.fetch_monthly_closes(symbol, start, end).await?;
    let bench = provider.fetch_monthly_closes(benchmark, start, end).await?;
    Ok((stock, bench))
}
