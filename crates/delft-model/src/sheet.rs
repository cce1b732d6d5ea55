//! A sparse grid of cells.

use crate::cell::CellRef;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Contents of one cell.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// No value.
    #[default]
    Empty,
    /// A number.
    Number(f64),
    /// Text, including error markers such as `#NUM!`.
    Text(String),
}

impl CellValue {
    /// The number held, if any.
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether the cell holds nothing.
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<Option<f64>> for CellValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Empty, Self::Number)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Number(v) => write!(f, "{v}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}

/// A named sheet. Cells that were never written read as [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<CellRef, CellValue>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Sheet name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cell contents; `None` when the cell was never written.
    pub fn get(&self, cell: CellRef) -> Option<&CellValue> {
        self.cells.get(&cell)
    }

    /// Numeric contents of a cell.
    pub fn number(&self, cell: CellRef) -> Option<f64> {
        self.get(cell).and_then(CellValue::as_number)
    }

    /// Write a cell. Writing [`CellValue::Empty`] clears it.
    pub fn set(&mut self, cell: CellRef, value: impl Into<CellValue>) {
        match value.into() {
            CellValue::Empty => {
                self.cells.remove(&cell);
            }
            value => {
                self.cells.insert(cell, value);
            }
        }
    }

    /// Write a rectangular block row-major, starting at `origin`.
    ///
    /// Row `i`, column `j` of `rows` lands at `origin` offset by `(i, j)`.
    /// Returns the number of cells written.
    pub fn write_region<R, C>(&mut self, origin: CellRef, rows: R) -> usize
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item = CellValue>,
    {
        let mut written = 0;
        for (i, row) in rows.into_iter().enumerate() {
            for (j, value) in row.into_iter().enumerate() {
                self.set(origin.offset(i as u32, j as u32), value);
                written += 1;
            }
        }
        written
    }

    /// Read a rectangular block of `rows × columns` starting at `origin`.
    pub fn read_region(&self, origin: CellRef, rows: u32, columns: u32) -> Vec<Vec<CellValue>> {
        (0..rows)
            .map(|i| {
                (0..columns)
                    .map(|j| {
                        self.get(origin.offset(i, j))
                            .cloned()
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .collect()
    }

    /// Bottom-right corner of the written area, if anything was written.
    pub fn extent(&self) -> Option<CellRef> {
        let row = self.cells.keys().map(|c| c.row).max()?;
        let column = self.cells.keys().map(|c| c.column).max()?;
        Some(CellRef { row, column })
    }

    /// Dense rows from `A1` to [`extent`](Self::extent).
    pub fn rows(&self) -> Vec<Vec<CellValue>> {
        self.extent().map_or_else(Vec::new, |end| {
            self.read_region(CellRef { row: 1, column: 1 }, end.row, end.column)
        })
    }

    /// Number of non-empty cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no cell has been written.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
