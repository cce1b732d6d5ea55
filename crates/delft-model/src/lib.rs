#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/delft/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod dcf;
pub mod error;
pub mod sheet;
pub mod workbook;

pub use cell::{CellRef, MAX_COLUMN, MAX_ROW, SlotRef};
pub use dcf::{DcfAssumptions, DcfBreakdown, DcfWorkbook, Driver, SlotLayout};
pub use error::{ModelError, Result};
pub use sheet::{CellValue, Sheet};
pub use workbook::Workbook;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
