//! Peer comparables table.

use delft_data::PeerSnapshot;
use serde::{Deserialize, Serialize};

/// One peer, with market cap in billions and multiples rounded to two
/// decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparableRow {
    /// Ticker symbol.
    #[serde(rename = "Ticker")]
    pub symbol: String,
    /// Market capitalisation, billions.
    #[serde(rename = "Market Cap ($B)")]
    pub market_cap_bn: Option<f64>,
    /// Trailing P/E.
    #[serde(rename = "P/E")]
    pub pe_ratio: Option<f64>,
    /// EV/EBITDA.
    #[serde(rename = "EV/EBITDA")]
    pub ev_to_ebitda: Option<f64>,
    /// Beta.
    #[serde(rename = "Beta")]
    pub beta: Option<f64>,
}

impl From<&PeerSnapshot> for ComparableRow {
    fn from(peer: &PeerSnapshot) -> Self {
        Self {
            symbol: peer.symbol.clone(),
            market_cap_bn: peer.market_cap.map(|v| round2(v / 1e9)),
            pe_ratio: peer.pe_ratio.map(round2),
            ev_to_ebitda: peer.ev_to_ebitda.map(round2),
            beta: peer.beta.map(round2),
        }
    }
}

/// Comparables for a peer group.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comparables {
    rows: Vec<ComparableRow>,
}

impl Comparables {
    /// Build from snapshots, keeping their order.
    pub fn from_snapshots<'a>(peers: impl IntoIterator<Item = &'a PeerSnapshot>) -> Self {
        Self {
            rows: peers.into_iter().map(ComparableRow::from).collect(),
        }
    }

    /// Rows in peer order.
    pub fn rows(&self) -> &[ComparableRow] {
        &self.rows
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no peers.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Median over the peers that report a value.
    pub fn median(&self, field: impl Fn(&ComparableRow) -> Option<f64>) -> Option<f64> {
        let mut values: Vec<f64> = self.rows.iter().filter_map(field).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        Some(if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        })
    }

    /// Medians of every column, as a row labelled `Median`.
    pub fn median_row(&self) -> ComparableRow {
        ComparableRow {
            symbol: "Median".to_string(),
            market_cap_bn: self.median(|r| r.market_cap_bn).map(round2),
            pe_ratio: self.median(|r| r.pe_ratio).map(round2),
            ev_to_ebitda: self.median(|r| r.ev_to_ebitda).map(round2),
            beta: self.median(|r| r.beta).map(round2),
        }
    }
}

impl std::fmt::Display for Comparables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"));
        writeln!(
            f,
            "{:<10}{:>18}{:>10}{:>12}{:>8}",
            "Ticker", "Market Cap ($B)", "P/E", "EV/EBITDA", "Beta"
        )?;
        writeln!(f, "{}", "-".repeat(58))?;
        for row in self.rows.iter().chain(std::iter::once(&self.median_row())) {
            writeln!(
                f,
                "{:<10}{:>18}{:>10}{:>12}{:>8}",
                row.symbol,
                cell(row.market_cap_bn),
                cell(row.pe_ratio),
                cell(row.ev_to_ebitda),
                cell(row.beta)
            )?;
        }
        Ok(())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
