//! Yahoo Finance quote provider.

pub mod quotes;

pub use quotes::{ProviderConfig, YahooQuoteProvider};
