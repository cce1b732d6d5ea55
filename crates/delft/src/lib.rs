#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/delft/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod peers;

// Re-export main types from sub-crates
pub use delft_data as data;
pub use delft_grid as grid;
pub use delft_metrics as metrics;
pub use delft_model as model;
pub use delft_output as output;

pub use peers::{Peer, PeerGroup};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
