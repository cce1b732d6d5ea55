//! Statement extraction.
//!
//! Each statement keeps an ordered list of provider keys and the labels they
//! are shown under. Values are scaled to millions and rounded to whole
//! millions, and fiscal years run oldest to newest.

use delft_data::RawStatement;
use serde::{Deserialize, Serialize};

/// Scale from reported units to millions.
const MILLIONS: f64 = 1_000_000.0;

/// A provider key and the label it is shown under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineItem {
    /// Key in the provider payload.
    pub key: &'static str,
    /// Display label.
    pub label: &'static str,
}

const fn item(key: &'static str, label: &'static str) -> LineItem {
    LineItem { key, label }
}

/// Income statement line items.
pub const INCOME_ITEMS: &[LineItem] = &[
    item("revenue", "Revenue"),
    item("costOfRevenue", "Cost of Sales"),
    item("grossProfit", "Gross Profit"),
    item("researchAndDevelopmentExpenses", "R&D Expense"),
    item("sellingGeneralAndAdministrativeExpenses", "SG&A Expense"),
    item("operatingIncome", "EBIT"),
    item("incomeTaxExpense", "Income Tax"),
    item("netIncome", "Net Income"),
];

/// Share count, reported on the income statement.
pub const SHARES_ITEM: LineItem = item("weightedAverageShsOut", "Shares Outstanding");

/// Balance sheet line items.
pub const BALANCE_ITEMS: &[LineItem] = &[
    item("totalAssets", "Total Assets"),
    item("cashAndShortTermInvestments", "Cash & Equivalents"),
    item("propertyPlantEquipmentNet", "Property, Plant & Equipment"),
    item("totalLiabilities", "Total Liabilities"),
    item("totalStockholdersEquity", "Total Equity"),
];

/// Cash flow line items.
pub const CASH_FLOW_ITEMS: &[LineItem] = &[
    item("operatingCashFlow", "Operating Cash Flow"),
    item("capitalExpenditure", "CapEx"),
];

/// Derived cash flow row, operating cash flow plus (negative) CapEx.
pub const FREE_CASH_FLOW: &str = "Free Cash Flow";

/// One labelled row, aligned with [`StatementTable::years`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    /// Display label.
    pub label: String,
    /// Value per fiscal year.
    pub values: Vec<Option<f64>>,
}

/// Line items by fiscal year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementTable {
    title: String,
    years: Vec<i32>,
    rows: Vec<StatementRow>,
}

impl StatementTable {
    /// Empty table over the given years (sorted, duplicates removed).
    pub fn new(title: impl Into<String>, mut years: Vec<i32>) -> Self {
        years.sort_unstable();
        years.dedup();
        Self {
            title: title.into(),
            years,
            rows: Vec::new(),
        }
    }

    /// Extract `items` from raw statements.
    ///
    /// When two statements report the same fiscal year, the first one wins;
    /// providers list the latest filing first. Statements without a usable
    /// fiscal year are skipped. A line item no statement carries becomes an
    /// all-missing row.
    pub fn from_raw(title: impl Into<String>, raw: &[RawStatement], items: &[LineItem]) -> Self {
        let title = title.into();
        let dated = by_fiscal_year(raw);

        let mut table = Self::new(title, dated.iter().map(|(y, _)| *y).collect());
        for line in items {
            if !dated.iter().any(|(_, s)| s.has(line.key)) {
                tracing::warn!(table = %table.title, key = line.key, "line item not found");
            }
            let values = dated
                .iter()
                .map(|(_, s)| s.value(line.key).map(to_millions))
                .collect();
            table.push_row(line.label, values);
        }
        table
    }

    /// Income statement with the share count appended.
    pub fn income(raw: &[RawStatement]) -> Self {
        let mut items = INCOME_ITEMS.to_vec();
        items.push(SHARES_ITEM);
        Self::from_raw("Income Statement", raw, &items)
    }

    /// Balance sheet.
    pub fn balance(raw: &[RawStatement]) -> Self {
        Self::from_raw("Balance Sheet", raw, BALANCE_ITEMS)
    }

    /// Cash flow statement with free cash flow derived.
    ///
    /// Free cash flow is summed from the reported amounts and rounded once,
    /// so it can differ by a million from the sum of the rounded rows.
    pub fn cash_flow(raw: &[RawStatement]) -> Self {
        let mut table = Self::from_raw("Cash Flow Statement", raw, CASH_FLOW_ITEMS);
        let [ocf, capex] = [CASH_FLOW_ITEMS[0].key, CASH_FLOW_ITEMS[1].key];
        let fcf = by_fiscal_year(raw)
            .into_iter()
            .map(|(_, s)| Some(to_millions(s.value(ocf)? + s.value(capex)?)))
            .collect();
        table.push_row(FREE_CASH_FLOW, fcf);
        table
    }

    /// Append a row. Values beyond the year count are dropped and short
    /// rows are padded with missing cells.
    pub fn push_row(&mut self, label: impl Into<String>, mut values: Vec<Option<f64>>) {
        values.resize(self.years.len(), None);
        self.rows.push(StatementRow {
            label: label.into(),
            values,
        });
    }

    /// Table title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Fiscal years, oldest first.
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Rows in insertion order.
    pub fn rows(&self) -> &[StatementRow] {
        &self.rows
    }

    /// Row by label.
    pub fn row(&self, label: &str) -> Option<&StatementRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Value of a line item in a fiscal year.
    pub fn value(&self, label: &str, year: i32) -> Option<f64> {
        let column = self.years.iter().position(|&y| y == year)?;
        self.row(label)?.values.get(column).copied().flatten()
    }

    /// Most recent value of a line item.
    pub fn latest(&self, label: &str) -> Option<f64> {
        self.row(label)?.values.last().copied().flatten()
    }

    /// Every `(label, year)` without a value.
    pub fn missing_cells(&self) -> Vec<(String, i32)> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.values
                    .iter()
                    .zip(&self.years)
                    .filter(|(v, _)| v.is_none())
                    .map(|(_, &year)| (row.label.clone(), year))
            })
            .collect()
    }

    /// Whether the table has no fiscal years.
    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

impl std::fmt::Display for StatementTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = 32 + 12 * self.years.len();
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(width))?;
        write!(f, "{:<32}", "")?;
        for year in &self.years {
            write!(f, "{year:>12}")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "-".repeat(width))?;
        for row in &self.rows {
            write!(f, "{:<32}", row.label)?;
            for value in &row.values {
                match value {
                    Some(v) => write!(f, "{v:>12.1}")?,
                    None => write!(f, "{:>12}", "n/a")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Statements keyed by fiscal year, oldest first. The first statement seen
/// for a year wins; statements without a fiscal year are skipped.
fn by_fiscal_year(raw: &[RawStatement]) -> Vec<(i32, &RawStatement)> {
    let mut dated: Vec<(i32, &RawStatement)> = Vec::with_capacity(raw.len());
    for statement in raw {
        match statement.fiscal_year() {
            Some(year) if !dated.iter().any(|(y, _)| *y == year) => {
                dated.push((year, statement));
            }
            Some(_) => {}
            None => tracing::warn!(date = %statement.date, "statement without fiscal year skipped"),
        }
    }
    dated.sort_by_key(|(year, _)| *year);
    dated
}

fn to_millions(value: f64) -> f64 {
    (value / MILLIONS).round()
}
