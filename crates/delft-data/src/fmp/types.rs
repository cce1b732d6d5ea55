//! Response types for the FMP endpoints Delft uses.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// Annual reports.
    #[default]
    Annual,
    /// Quarterly reports.
    Quarter,
}

impl Period {
    /// Query parameter value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// The three statements Delft collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Income statement.
    Income,
    /// Balance sheet.
    Balance,
    /// Cash flow statement.
    CashFlow,
}

impl StatementKind {
    /// FMP endpoint path.
    #[must_use]
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::Income => "income-statement",
            Self::Balance => "balance-sheet-statement",
            Self::CashFlow => "cash-flow-statement",
        }
    }

    /// Short name used in file names.
    #[must_use]
    pub const fn file_stem(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Balance => "balance",
            Self::CashFlow => "cashflow",
        }
    }
}

/// One reported period of a statement, with every line item kept as sent.
///
/// A line item that the provider omits, or sends as `null`, reads back as
/// `None` from [`value`](Self::value).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    /// Period end date (`YYYY-MM-DD`).
    pub date: String,
    /// Ticker symbol.
    #[serde(default)]
    pub symbol: String,
    /// Remaining fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl RawStatement {
    /// Numeric value of a line item.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<f64> {
        self.fields.get(key).and_then(number)
    }

    /// Whether the line item is present at all (even as `null`).
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Parsed period end date.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Fiscal year: `fiscalYear` when reported, else the year of `date`.
    #[must_use]
    pub fn fiscal_year(&self) -> Option<i32> {
        match self.fields.get("fiscalYear") {
            Some(Value::String(s)) => s.parse().ok(),
            Some(Value::Number(n)) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
            _ => self.parsed_date().map(|d| d.year()),
        }
    }
}

/// Peer valuation snapshot.
///
/// Every measure is optional; a value the provider does not report stays
/// `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PeerSnapshot {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: Option<String>,
    /// Market capitalisation in the quote currency.
    pub market_cap: Option<f64>,
    /// Trailing price to earnings.
    pub pe_ratio: Option<f64>,
    /// Enterprise value to EBITDA (trailing).
    pub ev_to_ebitda: Option<f64>,
    /// Beta reported by the provider.
    pub beta: Option<f64>,
    /// Trailing gross margin as a fraction.
    pub gross_margin: Option<f64>,
}

impl PeerSnapshot {
    /// Assemble a snapshot from the profile, ratios-ttm and key-metrics-ttm
    /// records of one symbol.
    #[must_use]
    pub fn from_records(
        symbol: &str,
        profile: &Map<String, Value>,
        ratios: &Map<String, Value>,
        metrics: &Map<String, Value>,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            name: profile
                .get("companyName")
                .and_then(Value::as_str)
                .map(str::to_string),
            market_cap: first(profile, &["marketCap", "mktCap"]),
            pe_ratio: first(ratios, &["priceToEarningsRatioTTM", "peRatioTTM"])
                .or_else(|| first(metrics, &["peRatioTTM"])),
            ev_to_ebitda: first(metrics, &["evToEBITDATTM", "enterpriseValueOverEBITDATTM"])
                .or_else(|| first(ratios, &["enterpriseValueMultipleTTM"])),
            beta: first(profile, &["beta"]),
            gross_margin: first(ratios, &["grossProfitMarginTTM"]),
        }
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse().ok().filter(|v: &f64| v.is_finite()),
        _ => None,
    }
}

fn first(record: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    keys.iter().find_map(|k| record.get(*k).and_then(number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_raw_statement_keeps_absent_items_absent() {
        let raw: RawStatement = serde_json::from_value(json!({
            "date": "2024-12-31",
            "symbol": "ASML",
            "fiscalYear": "2024",
            "revenue": 28262900000.0,
            "costOfRevenue": null,
        }))
        .unwrap();

        assert_eq!(raw.value("revenue"), Some(28_262_900_000.0));
        assert!(raw.has("costOfRevenue"));
        assert_eq!(raw.value("costOfRevenue"), None);
        assert!(!raw.has("grossProfit"));
        assert_eq!(raw.fiscal_year(), Some(2024));
    }

    #[test]
    fn test_fiscal_year_falls_back_to_date() {
        let raw: RawStatement =
            serde_json::from_value(json!({ "date": "2023-12-31", "revenue": 1 })).unwrap();
        assert_eq!(raw.fiscal_year(), Some(2023));
    }

    #[test]
    fn test_peer_snapshot_missing_stays_missing() {
        let profile = object(json!({
            "symbol": "KLAC",
            "companyName": "KLA Corporation",
            "marketCap": 95_000_000_000.0,
            "beta": 1.28,
        }));
        let ratios = object(json!({ "priceToEarningsRatioTTM": 31.2 }));
        let snapshot = PeerSnapshot::from_records("klac", &profile, &ratios, &Map::new());

        assert_eq!(snapshot.symbol, "KLAC");
        assert_eq!(snapshot.name.as_deref(), Some("KLA Corporation"));
        assert_eq!(snapshot.market_cap, Some(95e9));
        assert_eq!(snapshot.pe_ratio, Some(31.2));
        assert_eq!(snapshot.beta, Some(1.28));
        assert_eq!(snapshot.ev_to_ebitda, None);
        assert_eq!(snapshot.gross_margin, None);
    }

    #[rstest]
    #[case(StatementKind::Income, "income-statement", "income")]
    #[case(StatementKind::Balance, "balance-sheet-statement", "balance")]
    #[case(StatementKind::CashFlow, "cash-flow-statement", "cashflow")]
    fn test_statement_endpoints(
        #[case] kind: StatementKind,
        #[case] endpoint: &str,
        #[case] stem: &str,
    ) {
        assert_eq!(kind.endpoint(), endpoint);
        assert_eq!(kind.file_stem(), stem);
    }

    #[rstest]
    #[case(Period::Annual, "annual")]
    #[case(Period::Quarter, "quarter")]
    fn test_period_query_value(#[case] period: Period, #[case] expected: &str) {
        assert_eq!(period.as_str(), expected);
    }

    #[rstest]
    #[case(json!(0.4712), Some(0.4712))]
    #[case(json!(" 12.5 "), Some(12.5))]
    #[case(json!("n/a"), None)]
    #[case(json!(null), None)]
    #[case(json!(true), None)]
    fn test_number_parsing(#[case] value: Value, #[case] expected: Option<f64>) {
        match (number(&value), expected) {
            (Some(got), Some(want)) => assert_relative_eq!(got, want),
            (got, want) => assert_eq!(got, want),
        }
    }

    #[test]
    fn test_peer_snapshot_key_fallbacks() {
        let profile = object(json!({ "mktCap": "1.5e11" }));
        let metrics = object(json!({
            "peRatioTTM": 38.4,
            "enterpriseValueOverEBITDATTM": 27.9,
        }));
        let snapshot = PeerSnapshot::from_records("amat", &profile, &Map::new(), &metrics);

        assert_relative_eq!(snapshot.market_cap.unwrap(), 1.5e11);
        assert_relative_eq!(snapshot.pe_ratio.unwrap(), 38.4);
        assert_relative_eq!(snapshot.ev_to_ebitda.unwrap(), 27.9);
        assert_eq!(snapshot.name, None);
    }
}
