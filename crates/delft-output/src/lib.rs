#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/delft/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod heatmap;
pub mod report;
pub mod summary;
pub mod table;

pub use export::{ExportError, ExportFormat, Exporter};
pub use heatmap::HeatMap;
pub use report::{Report, ReportBuilder, ReportError};
pub use summary::{BaseCase, SensitivitySummary, valuation_waterfall};
pub use table::{DEFAULT_ORIGIN, SheetTable, read_table, write_table};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Format a fraction as a percentage with one decimal (`0.095` → `9.5%`).
pub fn percent_label(value: f64) -> String {
    format!("{:.1}%", value * 100.0)
}
