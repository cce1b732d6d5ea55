//! Sensitivity and valuation summaries.
//!
//! Formats mirror each other: [`SensitivitySummary::to_ascii_table`] for the
//! terminal, [`SensitivitySummary::to_markdown`] for reports, and `Display`
//! for a short status block.

use crate::percent_label;
use delft_grid::ResultMatrix;
use delft_model::DcfBreakdown;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The base-case scenario of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseCase {
    /// Row axis value.
    pub row_value: f64,
    /// Column axis value.
    pub column_value: f64,
    /// Value at that cell, if present.
    pub value: Option<f64>,
}

/// Range statistics of a sensitivity sweep.
///
/// # Examples
///
/// ```
/// use delft_grid::{Axis, Input, NoProgress, SensitivityModel, evaluate};
/// use delft_output::SensitivitySummary;
///
/// #[derive(Debug, Default)]
/// struct Ratio { g: f64, r: f64 }
///
/// impl SensitivityModel for Ratio {
///     type Error = std::convert::Infallible;
///     fn read_input(&self, input: Input) -> Result<f64, Self::Error> {
///         Ok(match input { Input::Row => self.g, Input::Column => self.r })
///     }
///     fn write_input(&mut self, input: Input, v: f64) -> Result<(), Self::Error> {
///         match input { Input::Row => self.g = v, Input::Column => self.r = v }
///         Ok(())
///     }
///     fn recompute(&mut self) -> Result<(), Self::Error> { Ok(()) }
///     fn read_output(&self) -> Result<Option<f64>, Self::Error> {
///         Ok(Some(100.0 / (self.r - self.g)))
///     }
/// }
///
/// let growth = Axis::new("Terminal growth", vec![0.02, 0.025]).unwrap();
/// let wacc = Axis::new("WACC", vec![0.09, 0.095]).unwrap();
/// let matrix = evaluate(growth, wacc, &mut Ratio::default(), &mut NoProgress).unwrap();
///
/// let summary = SensitivitySummary::new("ACME", &matrix, Some((0.025, 0.095)));
/// assert_eq!(summary.missing, 0);
/// assert!(summary.base_case.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySummary {
    /// Subject of the sweep.
    pub name: String,
    /// Row axis label.
    pub row_label: String,
    /// Column axis label.
    pub column_label: String,
    /// Table shape.
    pub shape: (usize, usize),
    /// Smallest present value.
    pub min: Option<f64>,
    /// Largest present value.
    pub max: Option<f64>,
    /// `max - min`.
    pub span: Option<f64>,
    /// Cells without a value.
    pub missing: usize,
    /// Base case, when both base values lie on the axes.
    pub base_case: Option<BaseCase>,
}

impl SensitivitySummary {
    /// Summarise `matrix`.
    ///
    /// `base` is `(row value, column value)`; it is located on the axes
    /// with an absolute tolerance of `1e-12`.
    pub fn new(name: impl Into<String>, matrix: &ResultMatrix, base: Option<(f64, f64)>) -> Self {
        let base_case = base.and_then(|(row_value, column_value)| {
            let (i, j) = matrix.position_of(row_value, column_value)?;
            Some(BaseCase {
                row_value,
                column_value,
                value: matrix.get(i, j),
            })
        });

        Self {
            name: name.into(),
            row_label: matrix.row_axis().label().to_string(),
            column_label: matrix.column_axis().label().to_string(),
            shape: matrix.shape(),
            min: matrix.min(),
            max: matrix.max(),
            span: matrix.span(),
            missing: matrix.missing_count(),
            base_case,
        }
    }

    fn base_case_line(&self) -> String {
        match self.base_case {
            Some(b) => format!(
                "{} = {}, {} = {}: {}",
                self.row_label,
                percent_label(b.row_value),
                self.column_label,
                percent_label(b.column_value),
                money(b.value)
            ),
            None => "not in table".to_string(),
        }
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\nSensitivity Summary: {}\n", self.name));
        output.push_str(&format!(
            "Grid: {} ({}) x {} ({})\n",
            self.row_label, self.shape.0, self.column_label, self.shape.1
        ));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!("  Minimum:                  {}\n", money(self.min)));
        output.push_str(&format!("  Maximum:                  {}\n", money(self.max)));
        output.push_str(&format!("  Range:                    {}\n", money(self.span)));
        output.push_str(&format!("  Missing cells:            {}\n", self.missing));
        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!("  Base case:                {}\n", self.base_case_line()));
        output.push_str(&"=".repeat(80));
        output.push('\n');

        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("# Sensitivity Summary: {}\n\n", self.name));
        output.push_str(&format!(
            "**Grid:** {} ({}) × {} ({})\n\n",
            self.row_label, self.shape.0, self.column_label, self.shape.1
        ));
        output.push_str("| Statistic | Value |\n");
        output.push_str("|-----------|-------|\n");
        output.push_str(&format!("| Minimum | {} |\n", money(self.min)));
        output.push_str(&format!("| Maximum | {} |\n", money(self.max)));
        output.push_str(&format!("| Range | {} |\n", money(self.span)));
        output.push_str(&format!("| Missing cells | {} |\n", self.missing));
        output.push_str(&format!("| Base case | {} |\n", self.base_case_line()));

        output
    }
}

impl fmt::Display for SensitivitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sensitivity Summary: {}", self.name)?;
        writeln!(f, "  Minimum: {}", money(self.min))?;
        writeln!(f, "  Maximum: {}", money(self.max))?;
        writeln!(f, "  Range: {}", money(self.span))?;
        if self.missing > 0 {
            writeln!(f, "  Missing cells: {}", self.missing)?;
        }
        writeln!(f, "  Base case: {}", self.base_case_line())
    }
}

/// Bridge from discounted cash flows to value per share, one line per step.
pub fn valuation_waterfall(breakdown: &DcfBreakdown, currency: &str) -> String {
    let mut output = String::new();
    let line = |label: &str, value: f64| format!("  {label:<32}{value:>16.0}\n");

    output.push_str(&format!(
        "\nDCF Valuation ({currency} m) at WACC {}, terminal growth {}\n",
        percent_label(breakdown.wacc),
        percent_label(breakdown.terminal_growth)
    ));
    output.push_str(&"=".repeat(50));
    output.push('\n');
    output.push_str(&line("PV of free cash flows", breakdown.pv_fcfs));
    output.push_str(&line("PV of terminal value", breakdown.pv_terminal_value));
    output.push_str(&line("Enterprise value", breakdown.enterprise_value));
    output.push_str(&line("Plus: cash", breakdown.cash));
    output.push_str(&line("Less: debt", -breakdown.debt));
    output.push_str(&line("Equity value", breakdown.equity_value));
    output.push_str(&"-".repeat(50));
    output.push('\n');
    output.push_str(&format!(
        "  {:<32}{:>16.2}\n",
        format!("Value per share ({currency})"),
        breakdown.value_per_share
    ));
    if let Some(upside) = breakdown.upside {
        output.push_str(&format!(
            "  {:<32}{:>15.1}%\n",
            "Upside vs current price",
            upside * 100.0
        ));
    }

    output
}

fn money(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use delft_grid::{Axis, Evaluator, Input, MissingPolicy, NoProgress, SensitivityModel};
    use rstest::rstest;

    /// `1000 * (r - g)`, missing when `r - g` rounds to 0.06.
    #[derive(Debug, Default)]
    struct Gap {
        g: f64,
        r: f64,
    }

    impl SensitivityModel for Gap {
        type Error = std::convert::Infallible;

        fn read_input(&self, input: Input) -> Result<f64, Self::Error> {
            Ok(match input {
                Input::Row => self.g,
                Input::Column => self.r,
            })
        }

        fn write_input(&mut self, input: Input, value: f64) -> Result<(), Self::Error> {
            match input {
                Input::Row => self.g = value,
                Input::Column => self.r = value,
            }
            Ok(())
        }

        fn recompute(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn read_output(&self) -> Result<Option<f64>, Self::Error> {
            let gap = self.r - self.g;
            Ok(((gap - 0.06).abs() > 1e-9).then_some(1000.0 * gap))
        }
    }

    fn matrix() -> ResultMatrix {
        let growth = Axis::new("Terminal growth", vec![0.02, 0.03]).unwrap();
        let wacc = Axis::new("WACC", vec![0.08, 0.09, 0.10]).unwrap();
        Evaluator::new(growth, wacc)
            .missing_policy(MissingPolicy::Mark)
            .run(&mut Gap::default(), &mut NoProgress)
            .unwrap()
    }

    #[test]
    fn test_statistics_skip_missing() {
        let summary = SensitivitySummary::new("ACME", &matrix(), None);
        assert_eq!(summary.shape, (2, 3));
        // Cells: g=0.02 → 60(missing), 70, 80; g=0.03 → 50, 60(missing), 70.
        assert_eq!(summary.missing, 2);
        assert_relative_eq!(summary.min.unwrap(), 50.0, epsilon = 1e-9);
        assert_relative_eq!(summary.max.unwrap(), 80.0, epsilon = 1e-9);
        assert_relative_eq!(summary.span.unwrap(), 30.0, epsilon = 1e-9);
        assert!(summary.base_case.is_none());
        assert!(summary.to_string().contains("not in table"));
    }

    #[test]
    fn test_base_case_found() {
        let summary = SensitivitySummary::new("ACME", &matrix(), Some((0.02, 0.09)));
        let base = summary.base_case.unwrap();
        assert_relative_eq!(base.value.unwrap(), 70.0, epsilon = 1e-9);
        assert!(summary.to_ascii_table().contains("Terminal growth = 2.0%, WACC = 9.0%: 70.00"));
    }

    #[rstest]
    #[case::growth_between_rows((0.025, 0.09))]
    #[case::wacc_between_columns((0.02, 0.085))]
    #[case::outside_grid((0.05, 0.20))]
    fn test_base_case_off_grid(#[case] base: (f64, f64)) {
        let summary = SensitivitySummary::new("ACME", &matrix(), Some(base));
        assert!(summary.base_case.is_none());
    }

    #[test]
    fn test_markdown() {
        let md = SensitivitySummary::new("ACME", &matrix(), None).to_markdown();
        assert!(md.starts_with("# Sensitivity Summary: ACME"));
        assert!(md.contains("| Missing cells | 2 |"));
    }

    #[test]
    fn test_waterfall() {
        let breakdown = DcfBreakdown {
            wacc: 0.095,
            terminal_growth: 0.025,
            pv_fcfs: 40_000.0,
            terminal_value: 200_000.0,
            pv_terminal_value: 120_000.0,
            enterprise_value: 160_000.0,
            cash: 12_000.0,
            debt: 5_000.0,
            equity_value: 167_000.0,
            value_per_share: 425.0,
            upside: Some(-0.15),
        };
        let text = valuation_waterfall(&breakdown, "EUR");
        assert!(text.contains("WACC 9.5%"));
        assert!(text.contains("-5000"));
        assert!(text.contains("425.00"));
        assert!(text.contains("-15.0%"));
    }
}
