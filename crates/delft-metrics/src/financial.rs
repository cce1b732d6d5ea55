//! Margin, growth and cash-conversion metrics per fiscal year.

use crate::statements::{FREE_CASH_FLOW, StatementTable};
use serde::{Deserialize, Serialize};

/// A per-year financial metric, expressed in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Gross profit over revenue.
    GrossMargin,
    /// EBIT over revenue.
    EbitMargin,
    /// Net income over revenue.
    NetMargin,
    /// Year-over-year revenue change.
    RevenueGrowth,
    /// Absolute CapEx over revenue.
    CapexToRevenue,
    /// Free cash flow over revenue.
    FcfMargin,
}

impl Metric {
    /// Every metric in display order.
    pub const ALL: [Self; 6] = [
        Self::GrossMargin,
        Self::EbitMargin,
        Self::NetMargin,
        Self::RevenueGrowth,
        Self::CapexToRevenue,
        Self::FcfMargin,
    ];

    /// Display label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::GrossMargin => "Gross Margin %",
            Self::EbitMargin => "EBIT Margin %",
            Self::NetMargin => "Net Margin %",
            Self::RevenueGrowth => "Revenue Growth %",
            Self::CapexToRevenue => "CapEx % of Revenue",
            Self::FcfMargin => "FCF Margin %",
        }
    }
}

/// Financial metrics by fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    table: StatementTable,
}

impl FinancialMetrics {
    /// Compute every [`Metric`] over the income statement's years.
    ///
    /// Cash flow figures are matched by fiscal year. A metric is missing when
    /// an input is missing or its denominator is zero; the first year has no
    /// revenue growth.
    pub fn compute(income: &StatementTable, cash_flow: &StatementTable) -> Self {
        let years = income.years().to_vec();
        let mut table = StatementTable::new("Financial Metrics", years.clone());

        for metric in Metric::ALL {
            let values = years
                .iter()
                .enumerate()
                .map(|(i, &year)| {
                    let revenue = income.value("Revenue", year);
                    let fraction = match metric {
                        Metric::GrossMargin => ratio(income.value("Gross Profit", year), revenue),
                        Metric::EbitMargin => ratio(income.value("EBIT", year), revenue),
                        Metric::NetMargin => ratio(income.value("Net Income", year), revenue),
                        Metric::RevenueGrowth => {
                            let prior = i.checked_sub(1).map(|p| years[p])?;
                            ratio(revenue, income.value("Revenue", prior)).map(|r| r - 1.0)
                        }
                        Metric::CapexToRevenue => {
                            ratio(cash_flow.value("CapEx", year).map(f64::abs), revenue)
                        }
                        Metric::FcfMargin => ratio(cash_flow.value(FREE_CASH_FLOW, year), revenue),
                    };
                    fraction.map(percent)
                })
                .collect();
            table.push_row(metric.label(), values);
        }

        Self { table }
    }

    /// Value of a metric in a fiscal year, in percent.
    pub fn get(&self, metric: Metric, year: i32) -> Option<f64> {
        self.table.value(metric.label(), year)
    }

    /// Metrics as a table, one row per metric.
    pub const fn table(&self) -> &StatementTable {
        &self.table
    }
}

impl std::fmt::Display for FinancialMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.table.fmt(f)
    }
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let d = denominator?;
    if d == 0.0 {
        return None;
    }
    Some(numerator? / d)
}

/// Fraction to percent, one decimal.
fn percent(fraction: f64) -> f64 {
    (fraction * 1000.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn income() -> StatementTable {
        let mut t = StatementTable::new("Income Statement", vec![2022, 2023, 2024]);
        t.push_row("Revenue", vec![Some(200.0), Some(250.0), Some(0.0)]);
        t.push_row("Gross Profit", vec![Some(100.0), Some(130.0), Some(0.0)]);
        t.push_row("EBIT", vec![Some(60.0), None, Some(-5.0)]);
        t.push_row("Net Income", vec![Some(50.0), Some(60.0), Some(-4.0)]);
        t
    }

    fn cash_flow() -> StatementTable {
        let mut t = StatementTable::new("Cash Flow Statement", vec![2023, 2024]);
        t.push_row("CapEx", vec![Some(-25.0), Some(-10.0)]);
        t.push_row(FREE_CASH_FLOW, vec![Some(40.0), Some(-1.0)]);
        t
    }

    #[rstest]
    #[case(Metric::GrossMargin, 2022, Some(50.0))]
    #[case(Metric::GrossMargin, 2023, Some(52.0))]
    #[case(Metric::EbitMargin, 2023, None)]
    #[case(Metric::NetMargin, 2024, None)]
    #[case(Metric::RevenueGrowth, 2022, None)]
    #[case(Metric::RevenueGrowth, 2023, Some(25.0))]
    #[case(Metric::RevenueGrowth, 2024, Some(-100.0))]
    #[case(Metric::CapexToRevenue, 2022, None)]
    #[case(Metric::CapexToRevenue, 2023, Some(10.0))]
    #[case(Metric::FcfMargin, 2023, Some(16.0))]
    fn test_metrics(#[case] metric: Metric, #[case] year: i32, #[case] expected: Option<f64>) {
        let metrics = FinancialMetrics::compute(&income(), &cash_flow());
        match (metrics.get(metric, year), expected) {
            (Some(actual), Some(expected)) => assert_relative_eq!(actual, expected),
            (actual, expected) => assert_eq!(actual, expected),
        }
    }

    #[test]
    fn test_one_decimal() {
        let mut t = StatementTable::new("i", vec![2024]);
        t.push_row("Revenue", vec![Some(3.0)]);
        t.push_row("Gross Profit", vec![Some(1.0)]);
        let metrics = FinancialMetrics::compute(&t, &StatementTable::new("c", vec![]));
        assert_eq!(metrics.get(Metric::GrossMargin, 2024), Some(33.3));
        assert_eq!(metrics.table().rows().len(), Metric::ALL.len());
    }
}
