//! The capability a model must offer to be swept.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Which of the two swept input slots a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum Input {
    /// Slot driven by the row axis.
    #[display("row")]
    Row,
    /// Slot driven by the column axis.
    #[display("column")]
    Column,
}

/// A valuation model reachable through two input slots and one output slot.
///
/// Implementations typically wrap shared external state (a workbook, a remote
/// calculation service). Writing an input does not by itself refresh the
/// output; the output is only valid immediately after [`recompute`] returns.
///
/// With the same inputs and no intervening writes, `recompute` followed by
/// `read_output` must give the same value.
///
/// [`recompute`]: SensitivityModel::recompute
pub trait SensitivityModel {
    /// Error raised by any model call.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Check that both input slots and the output slot resolve.
    ///
    /// Called once before anything is read or written.
    fn check_slots(&self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Read the current value of an input slot.
    fn read_input(&self, input: Input) -> Result<f64, Self::Error>;

    /// Overwrite an input slot.
    fn write_input(&mut self, input: Input, value: f64) -> Result<(), Self::Error>;

    /// Refresh every output from the current inputs.
    ///
    /// Blocks until all dependent outputs reflect the latest inputs.
    fn recompute(&mut self) -> Result<(), Self::Error>;

    /// Read the output slot. `None` means the output is missing or not numeric.
    fn read_output(&self) -> Result<Option<f64>, Self::Error>;
}

impl<M: SensitivityModel + ?Sized> SensitivityModel for &mut M {
    type Error = M::Error;

    fn check_slots(&self) -> Result<(), Self::Error> {
        (**self).check_slots()
    }

    fn read_input(&self, input: Input) -> Result<f64, Self::Error> {
        (**self).read_input(input)
    }

    fn write_input(&mut self, input: Input, value: f64) -> Result<(), Self::Error> {
        (**self).write_input(input, value)
    }

    fn recompute(&mut self) -> Result<(), Self::Error> {
        (**self).recompute()
    }

    fn read_output(&self) -> Result<Option<f64>, Self::Error> {
        (**self).read_output()
    }
}
