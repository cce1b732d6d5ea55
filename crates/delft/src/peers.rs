//! Peer groups for comparables.

use serde::{Deserialize, Serialize};

/// A company in a peer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    /// Ticker symbol.
    pub symbol: String,
    /// Company name.
    pub name: String,
}

impl Peer {
    /// Create a new peer.
    pub fn new(symbol: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
        }
    }
}

/// The subject company and the peers it is compared with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerGroup {
    /// Group name.
    pub name: String,
    peers: Vec<Peer>,
}

impl PeerGroup {
    /// Group from ticker symbols, names left blank. Symbols are upper-cased
    /// and duplicates dropped, keeping first occurrence order.
    pub fn from_symbols<S: AsRef<str>>(name: impl Into<String>, symbols: &[S]) -> Self {
        let mut peers: Vec<Peer> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !peers.iter().any(|p| p.symbol == symbol) {
                peers.push(Peer::new(symbol, ""));
            }
        }
        Self {
            name: name.into(),
            peers,
        }
    }

    /// Lithography and wafer-fab equipment makers.
    pub fn semiconductor_equipment() -> Self {
        Self {
            name: "Semiconductor Equipment".to_string(),
            peers: vec![
                Peer::new("ASML", "ASML Holding"),
                Peer::new("AMAT", "Applied Materials"),
                Peer::new("LRCX", "Lam Research"),
                Peer::new("KLAC", "KLA Corporation"),
            ],
        }
    }

    /// Peers in group order.
    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    /// Ticker symbols in group order.
    pub fn symbols(&self) -> Vec<&str> {
        self.peers.iter().map(|p| p.symbol.as_str()).collect()
    }

    /// Whether a symbol is in the group (case-insensitive).
    pub fn contains(&self, symbol: &str) -> bool {
        self.peers
            .iter()
            .any(|p| p.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Number of companies.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether the group is empty.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Default for PeerGroup {
    fn default() -> Self {
        Self::semiconductor_equipment()
    }
}
