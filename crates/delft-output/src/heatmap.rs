//! Text heat map of a sensitivity table.

use crate::percent_label;
use delft_grid::ResultMatrix;
use std::fmt;

/// Intensity shades from lowest to highest value.
const SHADES: [char; 5] = [' ', '░', '▒', '▓', '█'];

const LABEL_WIDTH: usize = 12;
const CELL_WIDTH: usize = 11;

/// Heat map of a result matrix.
///
/// Axis values print as percentages. Each cell carries a shade for where its
/// value falls between the table minimum and maximum, the base case is
/// bracketed, and missing cells print `n/a`.
#[derive(Debug, Clone, Copy)]
pub struct HeatMap<'a> {
    matrix: &'a ResultMatrix,
    base: Option<(usize, usize)>,
}

impl<'a> HeatMap<'a> {
    /// Heat map without a highlighted cell.
    pub const fn new(matrix: &'a ResultMatrix) -> Self {
        Self { matrix, base: None }
    }

    /// Highlight the cell at `(row value, column value)` if it is on the axes.
    pub fn with_base_case(mut self, row_value: f64, column_value: f64) -> Self {
        self.base = self.matrix.position_of(row_value, column_value);
        self
    }

    /// Shade index in `0..5` for a value.
    fn bucket(&self, value: f64) -> usize {
        match (self.matrix.min(), self.matrix.span()) {
            (Some(min), Some(span)) if span > 0.0 => {
                let scaled = (value - min) / span * SHADES.len() as f64;
                (scaled.floor().max(0.0) as usize).min(SHADES.len() - 1)
            }
            _ => 0,
        }
    }

    fn cell(&self, row: usize, column: usize) -> String {
        match self.matrix.get(row, column) {
            None => format!("{:>width$} ", "n/a", width = CELL_WIDTH - 1),
            Some(v) => {
                let shade = SHADES[self.bucket(v)];
                if self.base == Some((row, column)) {
                    format!("[{shade}{v:>8.0}]")
                } else {
                    format!(" {shade}{v:>8.0} ")
                }
            }
        }
    }
}

impl fmt::Display for HeatMap<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.matrix.row_axis();
        let columns = self.matrix.column_axis();

        writeln!(f, "{} \\ {}", rows.label(), columns.label())?;
        write!(f, "{:<LABEL_WIDTH$}", "")?;
        for value in columns.iter() {
            write!(f, "{:>CELL_WIDTH$}", percent_label(value))?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(LABEL_WIDTH + CELL_WIDTH * columns.len()))?;

        for (i, value) in rows.iter().enumerate() {
            write!(f, "{:<LABEL_WIDTH$}", percent_label(value))?;
            for j in 0..columns.len() {
                write!(f, "{}", self.cell(i, j))?;
            }
            writeln!(f)?;
        }

        let shades: String = SHADES[1..].iter().map(|c| format!("{c} ")).collect();
        write!(f, "shades {}(low to high), [ ] base case", shades)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delft_grid::{Axis, Evaluator, Input, MissingPolicy, NoProgress, SensitivityModel};
    use rstest::rstest;

    /// Value is `row + column` (as whole numbers), missing on the diagonal.
    #[derive(Debug, Default)]
    struct Sum {
        row: f64,
        column: f64,
    }

    impl SensitivityModel for Sum {
        type Error = std::convert::Infallible;

        fn read_input(&self, input: Input) -> Result<f64, Self::Error> {
            Ok(match input {
                Input::Row => self.row,
                Input::Column => self.column,
            })
        }

        fn write_input(&mut self, input: Input, value: f64) -> Result<(), Self::Error> {
            match input {
                Input::Row => self.row = value,
                Input::Column => self.column = value,
            }
            Ok(())
        }

        fn recompute(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_output(&self) -> Result<Option<f64>, Self::Error> {
            let same = (self.row - self.column).abs() < 1e-12;
            Ok((!same).then_some((self.row + self.column) * 1000.0))
        }
    }

    fn matrix() -> ResultMatrix {
        let rows = Axis::new("g", vec![0.01, 0.02, 0.03]).unwrap();
        let cols = Axis::new("WACC", vec![0.01, 0.05, 0.09]).unwrap();
        Evaluator::new(rows, cols)
            .missing_policy(MissingPolicy::Mark)
            .run(&mut Sum::default(), &mut NoProgress)
            .unwrap()
    }

    #[test]
    fn test_axis_labels_are_percentages() {
        let text = HeatMap::new(&matrix()).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "g \\ WACC");
        assert!(lines[1].contains("1.0%") && lines[1].contains("9.0%"));
        assert!(lines[3].starts_with("1.0%"));
    }

    #[test]
    fn test_missing_and_base_case() {
        let m = matrix();
        let text = HeatMap::new(&m).with_base_case(0.02, 0.05).to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[3].contains("n/a"));
        assert!(lines[4].contains('['));
        assert!(!lines[3].contains('['));

        let plain = HeatMap::new(&m).with_base_case(0.025, 0.05).to_string();
        assert!(plain.lines().take(6).all(|line| !line.contains('[')));
    }

    #[rstest]
    #[case(30.0, 0)]
    #[case(59.9, 1)]
    #[case(70.0, 2)]
    #[case(120.0, 4)]
    fn test_buckets(#[case] value: f64, #[case] expected: usize) {
        // Present values run 30 (0.02 + 0.01) to 120 (0.03 + 0.09).
        let m = matrix();
        assert_eq!(HeatMap::new(&m).bucket(value), expected);
    }
}
