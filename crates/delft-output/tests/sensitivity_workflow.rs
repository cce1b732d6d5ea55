//! Sweep a DCF workbook, persist the table, and summarise it.

use delft_grid::{Axis, Evaluator, GridError, MissingPolicy, NoProgress, Progress};
use delft_model::{DcfAssumptions, DcfWorkbook, SlotLayout};
use delft_output::{
    DEFAULT_ORIGIN, ExportFormat, Exporter, HeatMap, SensitivitySummary, read_table, write_table,
};

fn assumptions() -> DcfAssumptions {
    DcfAssumptions {
        company: "ASML".to_string(),
        currency: "EUR".to_string(),
        base_year: 2024,
        free_cash_flows: vec![9_800.0, 10_900.0, 12_100.0, 13_200.0, 14_300.0],
        wacc: 0.095,
        terminal_growth: 0.025,
        cash: 12_700.0,
        debt: 4_600.0,
        shares_outstanding: 393.0,
        current_price: Some(650.0),
        layout: SlotLayout::default(),
    }
}

#[test]
fn full_grid_sweep_round_trips_through_the_sheet() {
    let mut model = DcfWorkbook::new(assumptions()).unwrap();
    let growth = Axis::stepped("Terminal growth", 0.015, 0.050, 0.005).unwrap();
    let wacc = Axis::stepped("WACC", 0.080, 0.130, 0.005).unwrap();
    assert_eq!((growth.len(), wacc.len()), (8, 11));

    let mut seen = Vec::new();
    let matrix = Evaluator::new(growth, wacc)
        .missing_policy(MissingPolicy::Mark)
        .run(&mut model, &mut |p: Progress| seen.push(p.completed))
        .unwrap();
    assert_eq!(seen.len(), 88);
    assert_eq!(seen.last(), Some(&88));

    // Inputs are back at the base case.
    assert_eq!(model.wacc().unwrap(), 0.095);
    assert_eq!(model.terminal_growth().unwrap(), 0.025);

    let sheet = model.workbook_mut().sheet_mut("Sensitivity").unwrap();
    assert_eq!(write_table(sheet, DEFAULT_ORIGIN, &matrix).unwrap(), 88);
    let table = read_table(sheet, DEFAULT_ORIGIN).unwrap();
    assert_eq!(table.rows.len(), 8);
    assert_eq!(table.columns.len(), 11);
    assert_eq!(table.cells[0][0], matrix.get(0, 0));
    assert_eq!(table.cells[7][10], matrix.get(7, 10));

    let summary = SensitivitySummary::new("ASML", &matrix, Some((0.025, 0.095)));
    let base = summary.base_case.unwrap();
    let expected = model.valuation().unwrap().value_per_share;
    assert!((base.value.unwrap() - expected).abs() < 1e-9);
    assert_eq!(summary.missing, 0);
    assert!(summary.span.unwrap() > 0.0);

    // Cheapest corner: highest WACC, lowest growth.
    assert_eq!(summary.min, matrix.get(0, 10));
    assert_eq!(summary.max, matrix.get(7, 0));

    let map = HeatMap::new(&matrix).with_base_case(0.025, 0.095).to_string();
    assert!(map.contains("13.0%"));
    assert!(map.contains('['));
}

#[test]
fn no_solution_cells_are_marked_missing() {
    let mut model = DcfWorkbook::new(assumptions()).unwrap();
    let growth = Axis::new("Terminal growth", vec![0.02, 0.10]).unwrap();
    let wacc = Axis::new("WACC", vec![0.08, 0.10]).unwrap();

    let matrix = Evaluator::new(growth, wacc)
        .missing_policy(MissingPolicy::Mark)
        .run(&mut model, &mut NoProgress)
        .unwrap_or_else(|e| panic!("sweep failed: {e}"));
    assert!(matrix.get(1, 0).is_none());
    assert!(matrix.get(1, 1).is_none());
    assert!(matrix.get(0, 0).is_some());

    let csv = matrix.export_to_string(ExportFormat::Csv).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "row,column,row_value,column_value,value");
    assert_eq!(lines.len(), 5);
    assert!(lines[3].ends_with(','));
}

#[test]
fn missing_output_aborts_by_default_and_restores() {
    let mut model = DcfWorkbook::new(assumptions()).unwrap();
    let growth = Axis::new("Terminal growth", vec![0.02, 0.09]).unwrap();
    let wacc = Axis::new("WACC", vec![0.08]).unwrap();

    let result = Evaluator::new(growth, wacc).run(&mut model, &mut NoProgress);
    assert!(matches!(result, Err(GridError::MissingOutput(_))));
    assert_eq!(model.terminal_growth().unwrap(), 0.025);
    assert!(model.valuation().is_some());
}
