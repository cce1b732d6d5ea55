//! Named sheets addressed through `Sheet!A1` slots.

use crate::cell::SlotRef;
use crate::error::{ModelError, Result};
use crate::sheet::{CellValue, Sheet};
use serde::{Deserialize, Serialize};

/// An ordered collection of named sheets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// Create an empty workbook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, or return the existing sheet with that name.
    pub fn add_sheet(&mut self, name: &str) -> &mut Sheet {
        let index = match self.sheets.iter().position(|s| s.name() == name) {
            Some(index) => index,
            None => {
                self.sheets.push(Sheet::new(name));
                self.sheets.len() - 1
            }
        };
        &mut self.sheets[index]
    }

    /// Look up a sheet by name.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownSheet`] if no sheet has that name.
    pub fn sheet(&self, name: &str) -> Result<&Sheet> {
        self.sheets
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| ModelError::UnknownSheet(name.to_string()))
    }

    /// Look up a sheet by name for writing.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownSheet`] if no sheet has that name.
    pub fn sheet_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| ModelError::UnknownSheet(name.to_string()))
    }

    /// Sheets in insertion order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownSheet`] if the slot's sheet is missing.
    pub fn read(&self, slot: &SlotRef) -> Result<CellValue> {
        Ok(self
            .sheet(&slot.sheet)?
            .get(slot.cell)
            .cloned()
            .unwrap_or_default())
    }

    /// Numeric contents of a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotNumeric`] if the slot holds anything but a number.
    pub fn read_number(&self, slot: &SlotRef) -> Result<f64> {
        self.read(slot)?
            .as_number()
            .ok_or_else(|| ModelError::NotNumeric {
                slot: slot.to_string(),
            })
    }

    /// Write a slot.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownSheet`] if the slot's sheet is missing.
    pub fn write(&mut self, slot: &SlotRef, value: impl Into<CellValue>) -> Result<()> {
        self.sheet_mut(&slot.sheet)?.set(slot.cell, value);
        Ok(())
    }
}
