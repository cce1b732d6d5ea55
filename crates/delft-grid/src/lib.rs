#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/delft/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod axis;
pub mod error;
pub mod evaluator;
pub mod matrix;
pub mod model;
pub mod progress;

pub use axis::{Axis, MAX_STEPPED_VALUES, Scenario};
pub use error::{GridError, Result, Step};
pub use evaluator::{BaselineSnapshot, Evaluator, MissingPolicy, evaluate};
pub use matrix::ResultMatrix;
pub use model::{Input, SensitivityModel};
pub use progress::{NoProgress, Progress, ProgressObserver};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
