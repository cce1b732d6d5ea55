//! CSV and JSON export.
//!
//! Missing values are written as empty CSV fields and `null` in JSON.

use delft_grid::ResultMatrix;
use delft_metrics::{ComparableRow, Comparables, FinancialMetrics, MarketData, StatementTable};
use delft_model::{CellValue, Sheet};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A sheet layout cannot hold the data.
    #[error("Layout error: {0}")]
    Layout(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

fn json<T: Serialize + ?Sized>(value: &T, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(value)?),
        _ => Ok(serde_json::to_string(value)?),
    }
}

fn finish(wtr: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

fn field(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Exporter for StatementTable {
    /// CSV has a `Line Item` column followed by one column per fiscal year.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                let header = std::iter::once("Line Item".to_string())
                    .chain(self.years().iter().map(ToString::to_string));
                wtr.write_record(header)?;
                for row in self.rows() {
                    let record = std::iter::once(row.label.clone())
                        .chain(row.values.iter().map(|v| field(*v)));
                    wtr.write_record(record)?;
                }
                finish(wtr)
            }
            _ => json(self, format),
        }
    }
}

impl Exporter for FinancialMetrics {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        self.table().export_to_string(format)
    }
}

impl Exporter for Comparables {
    /// One record per peer, then a `Median` record.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let mut rows: Vec<ComparableRow> = self.rows().to_vec();
        rows.push(self.median_row());
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for row in &rows {
                    wtr.serialize(row)?;
                }
                finish(wtr)
            }
            _ => json(&rows, format),
        }
    }
}

impl Exporter for MarketData {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                wtr.serialize(self)?;
                finish(wtr)
            }
            _ => json(self, format),
        }
    }
}

/// Long-form record of one sensitivity cell.
#[derive(Debug, Serialize)]
struct CellRecord {
    row: usize,
    column: usize,
    row_value: f64,
    column_value: f64,
    value: Option<f64>,
}

impl Exporter for ResultMatrix {
    /// Long form: one record per scenario in row-major order, with columns
    /// `row,column,row_value,column_value,value`.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let records: Vec<CellRecord> = self
            .iter_cells()
            .map(|(s, value)| CellRecord {
                row: s.row,
                column: s.column,
                row_value: s.row_value,
                column_value: s.column_value,
                value,
            })
            .collect();
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::Writer::from_writer(vec![]);
                for record in &records {
                    wtr.serialize(record)?;
                }
                finish(wtr)
            }
            _ => json(&records, format),
        }
    }
}

impl Exporter for Sheet {
    /// Dense grid from `A1`, no header row.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows = self.rows();
        match format {
            ExportFormat::Csv => {
                let mut wtr = csv::WriterBuilder::new()
                    .flexible(true)
                    .from_writer(vec![]);
                for row in &rows {
                    wtr.write_record(row.iter().map(cell_text))?;
                }
                finish(wtr)
            }
            _ => json(&rows, format),
        }
    }
}

fn cell_text(value: &CellValue) -> String {
    match value {
        CellValue::Empty => String::new(),
        CellValue::Number(n) => n.to_string(),
        CellValue::Text(t) => t.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delft_data::PeerSnapshot;
    use delft_metrics::CostOfEquity;

    fn table() -> StatementTable {
        let mut t = StatementTable::new("Income Statement", vec![2023, 2024]);
        t.push_row("Revenue", vec![Some(27559.0), Some(28263.0)]);
        t.push_row("R&D Expense", vec![None, Some(4304.0)]);
        t
    }

    #[test]
    fn test_statement_csv() {
        let csv = table().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Line Item,2023,2024");
        assert_eq!(lines[1], "Revenue,27559,28263");
        assert_eq!(lines[2], "R&D Expense,,4304");
    }

    #[test]
    fn test_statement_json_keeps_nulls() {
        let json = table().export_to_string(ExportFormat::Json).unwrap();
        assert!(json.contains("null"));
        let pretty = table().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(pretty.contains("  "));
    }

    #[test]
    fn test_market_data_csv() {
        let data = CostOfEquity::new(0.04, 1.0).market_data();
        let csv = data.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("risk_free_rate,market_risk_premium,beta,cost_of_equity\n"));
    }

    #[test]
    fn test_comparables_csv_has_median() {
        let peers = [PeerSnapshot {
            symbol: "ASML".to_string(),
            pe_ratio: Some(35.0),
            ..Default::default()
        }];
        let csv = Comparables::from_snapshots(&peers)
            .export_to_string(ExportFormat::Csv)
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "Ticker,Market Cap ($B),P/E,EV/EBITDA,Beta");
        assert_eq!(lines[1], "ASML,,35.0,,");
        assert!(lines[2].starts_with("Median,"));
    }

    #[test]
    fn test_sheet_csv_is_dense() {
        let mut sheet = Sheet::new("s");
        sheet.set("A1".parse().unwrap(), "x");
        sheet.set("C2".parse().unwrap(), 1.5);
        let csv = sheet.export_to_string(ExportFormat::Csv).unwrap();
        assert_eq!(csv, "x,,\n,,1.5\n");
    }

    #[test]
    fn test_extension() {
        assert_eq!(ExportFormat::Csv.extension(), "csv");
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
