//! Sensitivity tables on workbook sheets.
//!
//! A table of `m × n` values sits at an origin cell. Row axis values fill
//! the `m` cells left of the origin column, column axis values the `n` cells
//! above the origin row, and the corner holds the two axis labels:
//!
//! ```text
//!        A            B      C    …
//!   5  g \ WACC     8.0%   8.5%
//!   6  1.5%         v00    v01
//!   7  2.0%         v10    v11
//! ```

use crate::export::ExportError;
use delft_grid::ResultMatrix;
use delft_model::{CellRef, CellValue, Sheet};

/// Default origin of the value block.
pub const DEFAULT_ORIGIN: CellRef = CellRef { row: 6, column: 2 };

/// Write `matrix` onto `sheet` with its values starting at `origin`.
///
/// Values are written row-major in the matrix's own order; missing cells are
/// cleared. Returns the number of value cells written, always `m × n`.
///
/// # Errors
///
/// Returns [`ExportError::Layout`] if the origin leaves no room for the axis
/// labels (it must be at or below row 2 and at or right of column B), or if
/// the table would run past the last row or column of the sheet.
pub fn write_table(
    sheet: &mut Sheet,
    origin: CellRef,
    matrix: &ResultMatrix,
) -> Result<usize, ExportError> {
    let (label_row, label_column) = label_position(origin)?;
    let (rows, cols) = matrix.shape();
    let fits = u32::try_from(rows - 1)
        .ok()
        .zip(u32::try_from(cols - 1).ok())
        .and_then(|(r, c)| origin.checked_offset(r, c))
        .is_some();
    if !fits {
        return Err(ExportError::Layout(format!(
            "a {rows} x {cols} table at {origin} runs past the sheet edge"
        )));
    }

    sheet.set(
        CellRef {
            row: label_row,
            column: label_column,
        },
        format!(
            "{} \\ {}",
            matrix.row_axis().label(),
            matrix.column_axis().label()
        ),
    );
    for (offset, value) in (0u32..).zip(matrix.column_axis().iter()) {
        let cell = CellRef {
            row: label_row,
            column: origin.column,
        };
        sheet.set(cell.offset(0, offset), value);
    }
    for (offset, value) in (0u32..).zip(matrix.row_axis().iter()) {
        let cell = CellRef {
            row: origin.row,
            column: label_column,
        };
        sheet.set(cell.offset(offset, 0), value);
    }

    let rows = matrix
        .cells()
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|v| CellValue::from(*v)).collect::<Vec<_>>());
    Ok(sheet.write_region(origin, rows))
}

/// A table read back from a sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// Row axis values, top to bottom.
    pub rows: Vec<f64>,
    /// Column axis values, left to right.
    pub columns: Vec<f64>,
    /// Values, row-major; non-numeric cells read as `None`.
    pub cells: Vec<Vec<Option<f64>>>,
}

/// Read a table laid out by [`write_table`].
///
/// The axes extend from the origin until the first non-numeric cell.
///
/// # Errors
///
/// Returns [`ExportError::Layout`] if the origin is invalid or either axis
/// is empty.
pub fn read_table(sheet: &Sheet, origin: CellRef) -> Result<SheetTable, ExportError> {
    let (label_row, label_column) = label_position(origin)?;

    let axis = |step: &dyn Fn(u32) -> CellRef| -> Vec<f64> {
        (0u32..)
            .map(|i| sheet.number(step(i)))
            .take_while(Option::is_some)
            .flatten()
            .collect()
    };
    let columns = axis(&|i| {
        CellRef {
            row: label_row,
            column: origin.column,
        }
        .offset(0, i)
    });
    let rows = axis(&|i| {
        CellRef {
            row: origin.row,
            column: label_column,
        }
        .offset(i, 0)
    });
    if rows.is_empty() || columns.is_empty() {
        return Err(ExportError::Layout(format!(
            "no sensitivity table at {origin}"
        )));
    }

    let cells = (0u32..)
        .zip(&rows)
        .map(|(r, _)| {
            (0u32..)
                .zip(&columns)
                .map(|(c, _)| sheet.number(origin.offset(r, c)))
                .collect()
        })
        .collect();

    Ok(SheetTable {
        rows,
        columns,
        cells,
    })
}

fn label_position(origin: CellRef) -> Result<(u32, u32), ExportError> {
    if origin.row < 2 || origin.column < 2 {
        return Err(ExportError::Layout(format!(
            "origin {origin} leaves no room for axis labels"
        )));
    }
    Ok((origin.row - 1, origin.column - 1))
}
