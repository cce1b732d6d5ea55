//! A1-style cell references.

use crate::error::{ModelError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Last row of a worksheet.
pub const MAX_ROW: u32 = 1_048_576;

/// Last column of a worksheet (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// A cell position, 1-based, ordered row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CellRef {
    /// Row number (1 = first row).
    pub row: u32,
    /// Column number (1 = column A).
    pub column: u32,
}

impl CellRef {
    /// Create a reference from 1-based row and column numbers.
    ///
    /// # Errors
    ///
    /// Returns an error if either coordinate is zero or past the sheet edge
    /// ([`MAX_ROW`], [`MAX_COLUMN`]).
    pub fn new(row: u32, column: u32) -> Result<Self> {
        if row == 0 || column == 0 || row > MAX_ROW || column > MAX_COLUMN {
            return Err(ModelError::InvalidReference(format!(
                "row {row}, column {column}"
            )));
        }
        Ok(Self { row, column })
    }

    /// The cell `rows` down and `columns` right of this one.
    ///
    /// Coordinates saturate rather than wrap; use
    /// [`checked_offset`](Self::checked_offset) to stay on the sheet.
    pub const fn offset(self, rows: u32, columns: u32) -> Self {
        Self {
            row: self.row.saturating_add(rows),
            column: self.column.saturating_add(columns),
        }
    }

    /// Like [`offset`](Self::offset), but `None` past [`MAX_ROW`] or
    /// [`MAX_COLUMN`].
    pub const fn checked_offset(self, rows: u32, columns: u32) -> Option<Self> {
        let moved = self.offset(rows, columns);
        if moved.row > MAX_ROW || moved.column > MAX_COLUMN {
            None
        } else {
            Some(moved)
        }
    }

    /// Column letters (`1 → "A"`, `28 → "AB"`).
    pub fn column_letters(&self) -> String {
        let mut n = self.column;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(char::from(b'A' + rem as u8));
            n = (n - 1) / 26;
        }
        letters.iter().rev().collect()
    }
}

impl FromStr for CellRef {
    type Err = ModelError;

    /// Parse `"B6"`, `"c36"` or `"$D$40"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ModelError::InvalidReference(s.to_string());
        let trimmed: String = s.trim().chars().filter(|c| *c != '$').collect();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        let column = letters
            .chars()
            .try_fold(0u32, |acc, c| {
                let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
                acc.checked_mul(26)?.checked_add(digit)
            })
            .ok_or_else(invalid)?;
        let row: u32 = digits.parse().map_err(|_| invalid())?;

        Self::new(row, column).map_err(|_| invalid())
    }
}

impl TryFrom<String> for CellRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CellRef> for String {
    fn from(cell: CellRef) -> Self {
        cell.to_string()
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_letters(), self.row)
    }
}

/// A cell on a named sheet, written `Sheet!A1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotRef {
    /// Sheet name.
    pub sheet: String,
    /// Cell on that sheet.
    pub cell: CellRef,
}

impl SlotRef {
    /// Create a slot reference.
    pub fn new(sheet: impl Into<String>, cell: CellRef) -> Self {
        Self {
            sheet: sheet.into(),
            cell,
        }
    }
}

impl FromStr for SlotRef {
    type Err = ModelError;

    /// Parse `"WACC!C36"` or `"DCF Calculation!B20"`. Quotes around the sheet
    /// name (`'DCF Calculation'!B20`) are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let (sheet, cell) = s
            .rsplit_once('!')
            .ok_or_else(|| ModelError::InvalidReference(s.to_string()))?;
        let sheet = sheet.trim().trim_matches('\'');
        if sheet.is_empty() {
            return Err(ModelError::InvalidReference(s.to_string()));
        }
        Ok(Self::new(sheet, cell.parse()?))
    }
}

impl TryFrom<String> for SlotRef {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<SlotRef> for String {
    fn from(slot: SlotRef) -> Self {
        slot.to_string()
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.sheet, self.cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("A1", 1, 1)]
    #[case("B6", 6, 2)]
    #[case("c36", 36, 3)]
    #[case("$D$40", 40, 4)]
    #[case("Z9", 9, 26)]
    #[case("AA10", 10, 27)]
    #[case("AB3", 3, 28)]
    fn test_parse_cell(#[case] text: &str, #[case] row: u32, #[case] column: u32) {
        let cell: CellRef = text.parse().unwrap();
        assert_eq!(cell, CellRef { row, column });
    }

    #[rstest]
    #[case("")]
    #[case("B")]
    #[case("12")]
    #[case("B0")]
    #[case("1B")]
    #[case("B-1")]
    #[case("B6C")]
    #[case("B4294967295")]
    #[case("B1048577")]
    #[case("XFE1")]
    #[case("ZZZZZZZ1")]
    fn test_parse_cell_rejects(#[case] text: &str) {
        assert!(text.parse::<CellRef>().is_err());
    }

    #[test]
    fn test_sheet_edge() {
        let last: CellRef = "XFD1048576".parse().unwrap();
        assert_eq!(last, CellRef { row: MAX_ROW, column: MAX_COLUMN });
        assert_eq!(last.checked_offset(0, 0), Some(last));
        assert_eq!(last.checked_offset(1, 0), None);
        assert_eq!(last.checked_offset(0, 1), None);

        let far = CellRef { row: u32::MAX, column: 2 };
        assert_eq!(far.offset(5, 0).row, u32::MAX);
        assert_eq!(far.checked_offset(1, 0), None);
    }

    #[test]
    fn test_cell_display() {
        let cell = CellRef::new(13, 12).unwrap();
        assert_eq!(cell.to_string(), "L13");
        assert_eq!(CellRef::new(1, 52).unwrap().to_string(), "AZ1");
    }

    #[test]
    fn test_parse_slot_with_spaces() {
        let slot: SlotRef = "DCF Calculation!B20".parse().unwrap();
        assert_eq!(slot.sheet, "DCF Calculation");
        assert_eq!(slot.cell, CellRef { row: 20, column: 2 });
        assert_eq!(slot.to_string(), "DCF Calculation!B20");

        let quoted: SlotRef = "'DCF Calculation'!B20".parse().unwrap();
        assert_eq!(quoted, slot);
    }

    #[test]
    fn test_slot_serde_as_string() {
        let slot: SlotRef = serde_json::from_str("\"WACC!C36\"").unwrap();
        assert_eq!(slot.cell.to_string(), "C36");
        assert_eq!(serde_json::to_string(&slot).unwrap(), "\"WACC!C36\"");
        assert!(serde_json::from_str::<SlotRef>("\"C36\"").is_err());
    }
}
