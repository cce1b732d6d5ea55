//! Raw FMP payloads through to tables and metrics.

use approx::assert_relative_eq;
use delft_data::RawStatement;
use delft_metrics::{FinancialMetrics, Metric, StatementTable};
use serde_json::json;

fn parse(value: serde_json::Value) -> Vec<RawStatement> {
    serde_json::from_value(value).unwrap()
}

fn income() -> Vec<RawStatement> {
    parse(json!([
        {
            "date": "2024-12-31", "symbol": "ASML", "fiscalYear": "2024", "period": "FY",
            "revenue": 28_262_900_000.0, "costOfRevenue": 13_418_600_000.0,
            "grossProfit": 14_844_300_000.0, "researchAndDevelopmentExpenses": 4_303_700_000.0,
            "sellingGeneralAndAdministrativeExpenses": 1_165_700_000.0,
            "operatingIncome": 9_018_100_000.0, "incomeTaxExpense": 1_450_600_000.0,
            "netIncome": 7_571_600_000.0, "weightedAverageShsOut": 393_277_000.0
        },
        {
            "date": "2023-12-31", "symbol": "ASML", "fiscalYear": "2023", "period": "FY",
            "revenue": 27_558_500_000.0, "costOfRevenue": 13_421_600_000.0,
            "grossProfit": 14_136_900_000.0, "researchAndDevelopmentExpenses": 3_981_300_000.0,
            "sellingGeneralAndAdministrativeExpenses": 1_113_400_000.0,
            "operatingIncome": 9_042_200_000.0, "incomeTaxExpense": 1_399_200_000.0,
            "netIncome": 7_838_900_000.0, "weightedAverageShsOut": 393_888_000.0
        }
    ]))
}

fn cash_flow() -> Vec<RawStatement> {
    parse(json!([
        {
            "date": "2024-12-31", "fiscalYear": "2024",
            "operatingCashFlow": 11_166_600_000.0, "capitalExpenditure": -2_067_400_000.0
        },
        {
            "date": "2023-12-31", "fiscalYear": "2023",
            "operatingCashFlow": 5_443_000_000.0, "capitalExpenditure": -2_155_800_000.0
        }
    ]))
}

#[test]
fn income_table_in_millions_oldest_first() {
    let table = StatementTable::income(&income());
    assert_eq!(table.years(), &[2023, 2024]);
    assert_eq!(table.value("Revenue", 2024), Some(28_263.0));
    assert_eq!(table.value("EBIT", 2023), Some(9_042.0));
    assert_eq!(table.value("Shares Outstanding", 2024), Some(393.0));
    assert!(table.missing_cells().is_empty());
}

#[test]
fn balance_sheet_without_data_reports_every_cell() {
    let raw = parse(json!([{ "date": "2024-12-31", "totalAssets": 48_598_900_000.0 }]));
    let table = StatementTable::balance(&raw);
    assert_eq!(table.value("Total Assets", 2024), Some(48_599.0));
    let missing: Vec<String> = table.missing_cells().into_iter().map(|(l, _)| l).collect();
    assert_eq!(
        missing,
        [
            "Cash & Equivalents",
            "Property, Plant & Equipment",
            "Total Liabilities",
            "Total Equity"
        ]
    );
}

#[test]
fn metrics_from_tables() {
    let income = StatementTable::income(&income());
    let cash_flow = StatementTable::cash_flow(&cash_flow());
    let metrics = FinancialMetrics::compute(&income, &cash_flow);

    assert_relative_eq!(metrics.get(Metric::GrossMargin, 2024).unwrap(), 52.5);
    assert_relative_eq!(metrics.get(Metric::RevenueGrowth, 2024).unwrap(), 2.6);
    assert_eq!(metrics.get(Metric::RevenueGrowth, 2023), None);
    assert_relative_eq!(metrics.get(Metric::FcfMargin, 2024).unwrap(), 32.2);
    assert_relative_eq!(metrics.get(Metric::CapexToRevenue, 2023).unwrap(), 7.8);
}
