//! Swept parameter axes and the scenarios they span.

use crate::error::{GridError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance used when locating a value on an axis.
const POSITION_TOLERANCE: f64 = 1e-12;

/// Largest axis [`Axis::stepped`] will generate.
pub const MAX_STEPPED_VALUES: usize = 10_000;

/// An ordered sequence of candidate values for one swept input.
///
/// Order defines the row (or column) order of the result matrix. Duplicate
/// values are allowed and yield duplicate rows or columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    label: String,
    values: Vec<f64>,
}

impl Axis {
    /// Create an axis from explicit values.
    ///
    /// # Errors
    ///
    /// Returns an error if `values` is empty or contains a non-finite value.
    ///
    /// # Examples
    ///
    /// ```
    /// use delft_grid::Axis;
    ///
    /// let wacc = Axis::new("WACC", vec![0.09, 0.095, 0.10]).unwrap();
    /// assert_eq!(wacc.len(), 3);
    /// assert_eq!(wacc.position(0.095), Some(1));
    /// ```
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let label = label.into();
        if values.is_empty() {
            return Err(GridError::EmptyAxis(label));
        }
        if let Some((index, &value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(GridError::NonFiniteAxisValue {
                axis: label,
                index,
                value,
            });
        }
        Ok(Self { label, values })
    }

    /// Create an axis from `start` to `end` inclusive in increments of `step`.
    ///
    /// Values are rounded to ten decimal places so that generated rates
    /// compare equal to their literal spelling (`0.08 + 3 * 0.005 == 0.095`).
    ///
    /// # Errors
    ///
    /// Returns an error if `step` is not positive, if `end < start`, or if the
    /// range would need more than [`MAX_STEPPED_VALUES`] values.
    pub fn stepped(label: impl Into<String>, start: f64, end: f64, step: f64) -> Result<Self> {
        if step.is_nan() || step <= 0.0 || !start.is_finite() || !end.is_finite() || end < start {
            return Err(GridError::InvalidStep { start, end, step });
        }
        let intervals = ((end - start) / step).round();
        if !intervals.is_finite() || intervals >= MAX_STEPPED_VALUES as f64 {
            return Err(GridError::InvalidStep { start, end, step });
        }
        let count = intervals as usize + 1;
        let values = (0..count)
            .map(|i| ((start + i as f64 * step) * 1e10).round() / 1e10)
            .collect();
        Self::new(label, values)
    }

    /// Axis label used in reports.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Axis values in sweep order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values.
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`; an axis holds at least one value.
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// First index holding `value`.
    pub fn position(&self, value: f64) -> Option<usize> {
        self.values
            .iter()
            .position(|v| (v - value).abs() <= POSITION_TOLERANCE)
    }

    /// Iterate over the values.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }

    /// Enumerate every scenario of `self × columns` in row-major order.
    pub fn scenarios<'a>(&'a self, columns: &'a Self) -> impl Iterator<Item = Scenario> + 'a {
        self.values.iter().enumerate().flat_map(move |(row, &row_value)| {
            columns
                .values
                .iter()
                .enumerate()
                .map(move |(column, &column_value)| Scenario {
                    row,
                    column,
                    row_value,
                    column_value,
                })
        })
    }
}

/// One cell of the grid: a row value paired with a column value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Row index (position on the first axis).
    pub row: usize,
    /// Column index (position on the second axis).
    pub column: usize,
    /// Row axis value.
    pub row_value: f64,
    /// Column axis value.
    pub column_value: f64,
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}] ({}, {})",
            self.row, self.column, self.row_value, self.column_value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_empty_axis_rejected() {
        let result = Axis::new("WACC", vec![]);
        assert!(matches!(result, Err(GridError::EmptyAxis(label)) if label == "WACC"));
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(f64::NEG_INFINITY)]
    fn test_non_finite_value_rejected(#[case] bad: f64) {
        let result = Axis::new("growth", vec![0.01, bad]);
        assert!(matches!(
            result,
            Err(GridError::NonFiniteAxisValue { index: 1, .. })
        ));
    }

    #[test]
    fn test_duplicates_accepted() {
        let axis = Axis::new("WACC", vec![0.09, 0.09, 0.10]).unwrap();
        assert_eq!(axis.len(), 3);
        assert_eq!(axis.position(0.09), Some(0));
    }

    #[test]
    fn test_stepped_matches_literals() {
        let wacc = Axis::stepped("WACC", 0.080, 0.130, 0.005).unwrap();
        assert_eq!(wacc.len(), 11);
        assert_eq!(wacc.get(3), Some(0.095));
        assert_eq!(wacc.get(10), Some(0.13));

        let growth = Axis::stepped("growth", 0.015, 0.050, 0.005).unwrap();
        assert_eq!(growth.len(), 8);
        assert_eq!(growth.position(0.025), Some(2));
    }

    #[rstest]
    #[case(0.0)]
    #[case(-0.005)]
    #[case(1e-300)]
    #[case(1e-12)]
    #[case(f64::MIN_POSITIVE)]
    fn test_stepped_rejects_bad_step(#[case] step: f64) {
        assert!(matches!(
            Axis::stepped("x", 0.01, 0.02, step),
            Err(GridError::InvalidStep { .. })
        ));
    }

    #[test]
    fn test_stepped_fine_grid_within_cap() {
        let axis = Axis::stepped("x", 0.0, 1.0, 0.001).unwrap();
        assert_eq!(axis.len(), 1001);
        assert_eq!(axis.get(1000), Some(1.0));
    }

    #[test]
    fn test_scenarios_row_major() {
        let rows = Axis::new("a", vec![1.0, 2.0]).unwrap();
        let cols = Axis::new("b", vec![10.0, 20.0, 30.0]).unwrap();
        let order: Vec<(usize, usize)> = rows.scenarios(&cols).map(|s| (s.row, s.column)).collect();
        assert_eq!(
            order,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
    }
}
