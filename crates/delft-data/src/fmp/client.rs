//! Financial Modeling Prep API client.

use super::types::{Period, PeerSnapshot, RawStatement, StatementKind};
use crate::error::{DataError, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use std::env;

/// Base URL for the FMP stable API.
const FMP_BASE_URL: &str = "https://financialmodelingprep.com/stable";

/// Wait suggested when FMP answers 429 without a `Retry-After` header.
const DEFAULT_RETRY_AFTER_MS: u64 = 60_000;

/// Financial Modeling Prep API client.
#[derive(Clone)]
pub struct FmpClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for FmpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FmpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl FmpClient {
    /// Create a client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: FMP_BASE_URL.to_string(),
        }
    }

    /// Create a client from the `FMP_API_KEY` environment variable.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::MissingApiKey`] if the variable is not set.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let api_key = env::var("FMP_API_KEY").map_err(|_| DataError::MissingApiKey)?;
        if api_key.trim().is_empty() {
            return Err(DataError::MissingApiKey);
        }
        Ok(Self::new(api_key))
    }

    /// Point the client at a different base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, endpoint: &str) -> String {
        let sep = if endpoint.contains('?') { '&' } else { '?' };
        format!("{}/{endpoint}{sep}apikey={}", self.base_url, self.api_key)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let response = self.client.get(self.url(endpoint)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map_or(DEFAULT_RETRY_AFTER_MS, |secs| secs * 1000);
            return Err(DataError::RateLimit { retry_after_ms });
        }

        let text = response.text().await?;
        if !status.is_success() {
            return Err(DataError::FmpApi(format!("HTTP {status}: {text}")));
        }
        if text.contains("\"Error Message\"") {
            return Err(DataError::FmpApi(text));
        }

        serde_json::from_str(&text)
            .map_err(|e| DataError::Parse(format!("{endpoint}: {e}")))
    }

    /// Fetch a statement, most recent period first.
    ///
    /// # Errors
    ///
    /// Returns an error for an empty symbol or if the request fails.
    pub async fn statements(
        &self,
        kind: StatementKind,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<RawStatement>> {
        let symbol = checked(symbol)?;
        let limit_param = limit.map(|l| format!("&limit={l}")).unwrap_or_default();
        let endpoint = format!(
            "{}?symbol={symbol}&period={}{limit_param}",
            kind.endpoint(),
            period.as_str(),
        );

        let statements: Vec<RawStatement> = self.get(&endpoint).await?;
        tracing::debug!(%symbol, ?kind, periods = statements.len(), "fetched statements");
        Ok(statements)
    }

    /// Annual or quarterly income statements.
    ///
    /// # Errors
    ///
    /// See [`statements`](Self::statements).
    pub async fn income_statement(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<RawStatement>> {
        self.statements(StatementKind::Income, symbol, period, limit)
            .await
    }

    /// Annual or quarterly balance sheets.
    ///
    /// # Errors
    ///
    /// See [`statements`](Self::statements).
    pub async fn balance_sheet(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<RawStatement>> {
        self.statements(StatementKind::Balance, symbol, period, limit)
            .await
    }

    /// Annual or quarterly cash flow statements.
    ///
    /// # Errors
    ///
    /// See [`statements`](Self::statements).
    pub async fn cash_flow(
        &self,
        symbol: &str,
        period: Period,
        limit: Option<u32>,
    ) -> Result<Vec<RawStatement>> {
        self.statements(StatementKind::CashFlow, symbol, period, limit)
            .await
    }

    /// Valuation snapshot for one peer.
    ///
    /// The profile is required. Ratios and key metrics are fetched
    /// alongside it; if either request fails the snapshot is returned with
    /// those measures missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile request fails or returns nothing.
    pub async fn peer_snapshot(&self, symbol: &str) -> Result<PeerSnapshot> {
        let symbol = checked(symbol)?;
        let profile_path = format!("profile?symbol={symbol}");
        let ratios_path = format!("ratios-ttm?symbol={symbol}");
        let metrics_path = format!("key-metrics-ttm?symbol={symbol}");
        let (profile, ratios, metrics) = tokio::join!(
            self.first_record(&profile_path),
            self.first_record(&ratios_path),
            self.first_record(&metrics_path),
        );

        let profile = profile?.ok_or_else(|| DataError::MissingData {
            symbol: symbol.clone(),
            reason: "empty company profile".to_string(),
        })?;
        let ratios = ratios.unwrap_or_else(|e| {
            tracing::warn!(%symbol, error = %e, "ratios-ttm unavailable");
            None
        });
        let metrics = metrics.unwrap_or_else(|e| {
            tracing::warn!(%symbol, error = %e, "key-metrics-ttm unavailable");
            None
        });

        Ok(PeerSnapshot::from_records(
            &symbol,
            &profile,
            &ratios.unwrap_or_default(),
            &metrics.unwrap_or_default(),
        ))
    }

    async fn first_record(&self, endpoint: &str) -> Result<Option<Map<String, Value>>> {
        let records: Vec<Map<String, Value>> = self.get(endpoint).await?;
        Ok(records.into_iter().next())
    }
}

fn checked(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(DataError::InvalidSymbol("Empty symbol".to_string()));
    }
    Ok(symbol.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let client = FmpClient::new("test_key");
        assert_eq!(
            client.url("profile?symbol=ASML"),
            "https://financialmodelingprep.com/stable/profile?symbol=ASML&apikey=test_key"
        );
        assert_eq!(
            client.url("ratios-ttm"),
            "https://financialmodelingprep.com/stable/ratios-ttm?apikey=test_key"
        );
    }

    #[test]
    fn test_base_url_override() {
        let client = FmpClient::new("k").with_base_url("http://localhost:8080/");
        assert_eq!(client.url("quote"), "http://localhost:8080/quote?apikey=k");
    }

    #[test]
    fn test_debug_hides_key() {
        let client = FmpClient::new("secret");
        assert!(!format!("{client:?}").contains("secret"));
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let client = FmpClient::new("k");
        let result = client.income_statement("  ", Period::Annual, Some(4)).await;
        assert!(matches!(result, Err(DataError::InvalidSymbol(_))));
        assert!(matches!(
            client.peer_snapshot("").await,
            Err(DataError::InvalidSymbol(_))
        ));
    }

    #[tokio::test]
    async fn test_peer_snapshot_requires_profile() {
        // Nothing listens on the discard port, so every request fails fast.
        let client = FmpClient::new("k").with_base_url("http://127.0.0.1:9/");
        let result = client.peer_snapshot("asml").await;
        assert!(matches!(
            result,
            Err(DataError::Network(_) | DataError::FmpApi(_))
        ));
    }
}
