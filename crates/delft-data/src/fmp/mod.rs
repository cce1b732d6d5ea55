//! Financial Modeling Prep statements and peer snapshots.

pub mod client;
pub mod types;

pub use client::FmpClient;
pub use types::{Period, PeerSnapshot, RawStatement, StatementKind};
