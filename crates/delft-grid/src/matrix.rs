//! The matrix of model outputs produced by one sweep.

use crate::axis::{Axis, Scenario};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// Outputs of one sweep, indexed like the scenario enumeration.
///
/// Entry `(i, j)` holds the output for `(rows[i], columns[j])`. A `None`
/// entry marks a scenario whose output was missing or non-numeric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultMatrix {
    rows: Axis,
    columns: Axis,
    cells: Array2<Option<f64>>,
}

impl ResultMatrix {
    pub(crate) const fn new(rows: Axis, columns: Axis, cells: Array2<Option<f64>>) -> Self {
        Self {
            rows,
            columns,
            cells,
        }
    }

    /// Row axis.
    pub const fn row_axis(&self) -> &Axis {
        &self.rows
    }

    /// Column axis.
    pub const fn column_axis(&self) -> &Axis {
        &self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.cells.nrows()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cells.ncols()
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        self.cells.dim()
    }

    /// Output at `(row, column)`, `None` when out of range or missing.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.cells.get((row, column)).copied().flatten()
    }

    /// One row of outputs.
    pub fn row(&self, row: usize) -> Option<ArrayView1<'_, Option<f64>>> {
        (row < self.rows()).then(|| self.cells.row(row))
    }

    /// Underlying cells.
    pub const fn cells(&self) -> &Array2<Option<f64>> {
        &self.cells
    }

    /// Output for the scenario whose axis values are `row_value` and `column_value`.
    pub fn value_at(&self, row_value: f64, column_value: f64) -> Option<f64> {
        let (row, column) = self.position_of(row_value, column_value)?;
        self.get(row, column)
    }

    /// Indices of the first scenario matching both axis values.
    pub fn position_of(&self, row_value: f64, column_value: f64) -> Option<(usize, usize)> {
        Some((
            self.rows.position(row_value)?,
            self.columns.position(column_value)?,
        ))
    }

    /// Present outputs in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells.iter().filter_map(|v| *v)
    }

    /// Every cell with its scenario, in row-major order.
    pub fn iter_cells(&self) -> impl Iterator<Item = (Scenario, Option<f64>)> + '_ {
        self.rows
            .scenarios(&self.columns)
            .map(|s| (s, self.cells[(s.row, s.column)]))
    }

    /// Number of cells without an output.
    pub fn missing_count(&self) -> usize {
        self.cells.iter().filter(|v| v.is_none()).count()
    }

    /// Smallest present output.
    pub fn min(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    /// Largest present output.
    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    /// `max - min` over present outputs.
    pub fn span(&self) -> Option<f64> {
        Some(self.max()? - self.min()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> ResultMatrix {
        ResultMatrix::new(
            Axis::new("a", vec![0.09, 0.10]).unwrap(),
            Axis::new("b", vec![0.02, 0.025, 0.03]).unwrap(),
            array![
                [Some(120.0), Some(130.0), None],
                [Some(90.0), Some(100.0), Some(110.0)]
            ],
        )
    }

    #[test]
    fn test_shape_and_lookup() {
        let m = sample();
        assert_eq!(m.shape(), (2, 3));
        assert_eq!(m.get(1, 1), Some(100.0));
        assert_eq!(m.get(0, 2), None);
        assert_eq!(m.get(5, 0), None);
        assert_eq!(m.value_at(0.10, 0.025), Some(100.0));
        assert_eq!(m.position_of(0.10, 0.04), None);
    }

    #[test]
    fn test_range_ignores_missing() {
        let m = sample();
        assert_eq!(m.min(), Some(90.0));
        assert_eq!(m.max(), Some(130.0));
        assert_eq!(m.span(), Some(40.0));
        assert_eq!(m.missing_count(), 1);
    }

    #[test]
    fn test_iter_cells_row_major() {
        let m = sample();
        let cells: Vec<_> = m.iter_cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[3].0.row, 1);
        assert_eq!(cells[3].0.column, 0);
        assert_eq!(cells[3].1, Some(90.0));
    }
}
