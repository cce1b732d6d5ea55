#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/delft/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod beta;
pub mod capm;
pub mod comparables;
pub mod error;
pub mod financial;
pub mod statements;

pub use beta::{BetaConfig, BetaEstimate, estimate_beta, monthly_returns};
pub use capm::{CostOfEquity, DEFAULT_MARKET_RISK_PREMIUM, MarketData};
pub use comparables::{ComparableRow, Comparables};
pub use error::{MetricsError, Result};
pub use financial::{FinancialMetrics, Metric};
pub use statements::{LineItem, StatementRow, StatementTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
