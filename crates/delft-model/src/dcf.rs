//! Discounted-cash-flow model laid out on a [`Workbook`].
//!
//! The workbook carries four sheets:
//!
//! - `WACC`: discount rate at `C36`
//! - `Projections`: fiscal years in row 1, unlevered free cash flow in row 2
//! - `DCF Calculation`: terminal growth at `B20`, bridge from enterprise value
//!   to equity in column D (rows 32 to 39), value per share at `D40`
//! - `Sensitivity`: empty, for sweep results
//!
//! Enterprise value is the present value of the explicit free cash flows plus
//! a Gordon-growth terminal value on the last one:
//!
//! ```text
//! EV  = Σ FCF_t / (1 + wacc)^t  +  FCF_N · (1 + g) / (wacc − g) / (1 + wacc)^N
//! Eq  = EV + cash − debt
//! VPS = Eq / shares
//! ```

use crate::cell::{CellRef, SlotRef};
use crate::error::{ModelError, Result};
use crate::sheet::CellValue;
use crate::workbook::Workbook;
use delft_grid::{Input, SensitivityModel};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Marker written to output cells when the model has no finite solution.
pub const NUM_ERROR: &str = "#NUM!";

const WACC_SHEET: &str = "WACC";
const PROJECTIONS_SHEET: &str = "Projections";
const DCF_SHEET: &str = "DCF Calculation";
const SENSITIVITY_SHEET: &str = "Sensitivity";

/// Rows of the equity bridge in the `DCF Calculation` sheet, column D.
const BRIDGE: [(&str, u32); 8] = [
    ("Sum of PV of FCFs:", 32),
    ("Plus: PV of Terminal Value:", 33),
    ("Enterprise Value:", 34),
    ("Plus: Cash & Cash Equivalents:", 35),
    ("Less: Total Debt:", 36),
    ("Equity Value:", 37),
    ("Shares Outstanding (M):", 38),
    ("Current Market Price:", 39),
];

/// Which model input an axis drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// Discount rate.
    Wacc,
    /// Terminal growth rate.
    #[default]
    TerminalGrowth,
}

/// Where the swept inputs and the output live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotLayout {
    /// Discount rate slot.
    pub wacc: SlotRef,
    /// Terminal growth slot.
    pub terminal_growth: SlotRef,
    /// Value per share slot.
    pub value_per_share: SlotRef,
    /// Input driven by the row axis; the other input takes the columns.
    pub rows: Driver,
}

impl Default for SlotLayout {
    fn default() -> Self {
        Self {
            wacc: SlotRef::new(WACC_SHEET, CellRef { row: 36, column: 3 }),
            terminal_growth: SlotRef::new(DCF_SHEET, CellRef { row: 20, column: 2 }),
            value_per_share: SlotRef::new(DCF_SHEET, CellRef { row: 40, column: 4 }),
            rows: Driver::TerminalGrowth,
        }
    }
}

impl SlotLayout {
    /// Slot behind a sweep input.
    pub const fn slot(&self, input: Input) -> &SlotRef {
        match (input, self.rows) {
            (Input::Row, Driver::TerminalGrowth) | (Input::Column, Driver::Wacc) => {
                &self.terminal_growth
            }
            (Input::Row, Driver::Wacc) | (Input::Column, Driver::TerminalGrowth) => &self.wacc,
        }
    }
}

/// Model assumptions, loaded from JSON.
///
/// Monetary amounts are in millions; `shares_outstanding` is in millions of
/// shares, so the value per share comes out in currency units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfAssumptions {
    /// Company name or ticker.
    pub company: String,
    /// Reporting currency.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Last reported fiscal year; projections start the year after.
    pub base_year: i32,
    /// Unlevered free cash flow for each projected year.
    pub free_cash_flows: Vec<f64>,
    /// Discount rate.
    pub wacc: f64,
    /// Perpetual growth after the last projected year.
    pub terminal_growth: f64,
    /// Cash and equivalents.
    #[serde(default)]
    pub cash: f64,
    /// Total debt.
    #[serde(default)]
    pub debt: f64,
    /// Diluted shares outstanding.
    pub shares_outstanding: f64,
    /// Current share price, for upside.
    #[serde(default)]
    pub current_price: Option<f64>,
    /// Slot layout.
    #[serde(default)]
    pub layout: SlotLayout,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl DcfAssumptions {
    /// Load assumptions from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`validate`](Self::validate).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let assumptions: Self = serde_json::from_str(&text)?;
        assumptions.validate()?;
        Ok(assumptions)
    }

    /// Check the assumptions can produce a valuation.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidAssumptions`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(ModelError::InvalidAssumptions(msg.to_string()));
        if self.free_cash_flows.is_empty() {
            return invalid("at least one projected free cash flow is required");
        }
        if self.free_cash_flows.iter().any(|v| !v.is_finite()) {
            return invalid("free cash flows must be finite");
        }
        if !(self.shares_outstanding.is_finite() && self.shares_outstanding > 0.0) {
            return invalid("shares outstanding must be positive");
        }
        if !self.wacc.is_finite() || !self.terminal_growth.is_finite() {
            return invalid("wacc and terminal growth must be finite");
        }
        Ok(())
    }

    /// Projected fiscal years.
    pub fn projection_years(&self) -> impl Iterator<Item = i32> + '_ {
        (1..=self.free_cash_flows.len() as i32).map(move |t| self.base_year + t)
    }
}

/// Outputs of one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfBreakdown {
    /// Discount rate used.
    pub wacc: f64,
    /// Terminal growth used.
    pub terminal_growth: f64,
    /// Sum of discounted explicit free cash flows.
    pub pv_fcfs: f64,
    /// Undiscounted terminal value.
    pub terminal_value: f64,
    /// Discounted terminal value.
    pub pv_terminal_value: f64,
    /// `pv_fcfs + pv_terminal_value`.
    pub enterprise_value: f64,
    /// Cash added in the bridge.
    pub cash: f64,
    /// Debt subtracted in the bridge.
    pub debt: f64,
    /// `enterprise_value + cash - debt`.
    pub equity_value: f64,
    /// `equity_value / shares`.
    pub value_per_share: f64,
    /// `value_per_share / current_price - 1`, when a price is known.
    pub upside: Option<f64>,
}

impl DcfBreakdown {
    /// Evaluate the model at the given rates.
    ///
    /// Returns `None` when there is no finite solution: `wacc <= g`,
    /// `wacc <= -1`, or the assumptions are invalid.
    pub fn compute(assumptions: &DcfAssumptions, wacc: f64, terminal_growth: f64) -> Option<Self> {
        if assumptions.validate().is_err() || wacc <= terminal_growth || wacc <= -1.0 {
            return None;
        }

        let discount = 1.0 + wacc;
        let pv_fcfs: f64 = assumptions
            .free_cash_flows
            .iter()
            .zip(1..)
            .map(|(fcf, t)| fcf / discount.powi(t))
            .sum();

        let n = assumptions.free_cash_flows.len() as i32;
        let last = *assumptions.free_cash_flows.last()?;
        let terminal_value = last * (1.0 + terminal_growth) / (wacc - terminal_growth);
        let pv_terminal_value = terminal_value / discount.powi(n);

        let enterprise_value = pv_fcfs + pv_terminal_value;
        let equity_value = enterprise_value + assumptions.cash - assumptions.debt;
        let value_per_share = equity_value / assumptions.shares_outstanding;
        let upside = assumptions
            .current_price
            .filter(|p| *p > 0.0)
            .map(|p| value_per_share / p - 1.0);

        value_per_share.is_finite().then_some(Self {
            wacc,
            terminal_growth,
            pv_fcfs,
            terminal_value,
            pv_terminal_value,
            enterprise_value,
            cash: assumptions.cash,
            debt: assumptions.debt,
            equity_value,
            value_per_share,
            upside,
        })
    }
}

/// A DCF model held in a workbook and reachable through named slots.
#[derive(Debug, Clone)]
pub struct DcfWorkbook {
    assumptions: DcfAssumptions,
    workbook: Workbook,
    last: Option<DcfBreakdown>,
}

impl DcfWorkbook {
    /// Lay out the assumptions on a fresh workbook and compute once.
    ///
    /// # Errors
    ///
    /// Returns an error if the assumptions are invalid or a layout slot names
    /// a sheet the model does not create.
    pub fn new(assumptions: DcfAssumptions) -> Result<Self> {
        assumptions.validate()?;

        let mut workbook = Workbook::new();
        for name in [WACC_SHEET, PROJECTIONS_SHEET, DCF_SHEET, SENSITIVITY_SHEET] {
            workbook.add_sheet(name);
        }

        let projections = workbook.sheet_mut(PROJECTIONS_SHEET)?;
        projections.set(CellRef { row: 1, column: 1 }, "Fiscal Year");
        projections.set(CellRef { row: 2, column: 1 }, "Unlevered Free Cash Flow (FCF)");
        for ((year, fcf), column) in assumptions
            .projection_years()
            .zip(&assumptions.free_cash_flows)
            .zip(2..)
        {
            projections.set(CellRef { row: 1, column }, f64::from(year));
            projections.set(CellRef { row: 2, column }, *fcf);
        }

        let dcf = workbook.sheet_mut(DCF_SHEET)?;
        for (label, row) in BRIDGE {
            dcf.set(CellRef { row, column: 1 }, label);
        }
        dcf.set(CellRef { row: 40, column: 1 }, "DCF VALUE PER SHARE:");

        let layout = &assumptions.layout;
        workbook.write(&layout.wacc, assumptions.wacc)?;
        workbook.write(&layout.terminal_growth, assumptions.terminal_growth)?;

        let mut model = Self {
            assumptions,
            workbook,
            last: None,
        };
        model.check_layout()?;
        model.evaluate()?;
        Ok(model)
    }

    /// Load assumptions from JSON and build the model.
    ///
    /// # Errors
    ///
    /// See [`DcfAssumptions::from_json_file`] and [`DcfWorkbook::new`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(DcfAssumptions::from_json_file(path)?)
    }

    /// Model assumptions.
    pub const fn assumptions(&self) -> &DcfAssumptions {
        &self.assumptions
    }

    /// Underlying workbook.
    pub const fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    /// Underlying workbook, for writing results back.
    pub const fn workbook_mut(&mut self) -> &mut Workbook {
        &mut self.workbook
    }

    /// Result of the most recent recompute; `None` if it had no solution.
    pub const fn valuation(&self) -> Option<&DcfBreakdown> {
        self.last.as_ref()
    }

    /// Discount rate currently in the workbook.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is missing or not numeric.
    pub fn wacc(&self) -> Result<f64> {
        self.workbook.read_number(&self.assumptions.layout.wacc)
    }

    /// Terminal growth currently in the workbook.
    ///
    /// # Errors
    ///
    /// Returns an error if the slot is missing or not numeric.
    pub fn terminal_growth(&self) -> Result<f64> {
        self.workbook
            .read_number(&self.assumptions.layout.terminal_growth)
    }

    fn check_layout(&self) -> Result<()> {
        let layout = &self.assumptions.layout;
        for slot in [&layout.wacc, &layout.terminal_growth, &layout.value_per_share] {
            self.workbook.sheet(&slot.sheet)?;
        }
        Ok(())
    }

    /// Recompute every output from the current workbook inputs.
    fn evaluate(&mut self) -> Result<()> {
        let wacc = self.wacc()?;
        let growth = self.terminal_growth()?;
        self.last = DcfBreakdown::compute(&self.assumptions, wacc, growth);

        let outputs: Vec<CellValue> = match &self.last {
            Some(b) => [
                b.pv_fcfs,
                b.pv_terminal_value,
                b.enterprise_value,
                b.cash,
                b.debt,
                b.equity_value,
                self.assumptions.shares_outstanding,
            ]
            .into_iter()
            .map(CellValue::Number)
            .collect(),
            None => {
                tracing::debug!(wacc, growth, "no finite DCF solution");
                vec![CellValue::from(NUM_ERROR); 7]
            }
        };

        let dcf = self.workbook.sheet_mut(DCF_SHEET)?;
        for ((_, row), value) in BRIDGE.iter().zip(outputs) {
            dcf.set(CellRef { row: *row, column: 4 }, value);
        }
        dcf.set(
            CellRef { row: 39, column: 4 },
            CellValue::from(self.assumptions.current_price),
        );

        let value = self
            .last
            .map_or_else(|| CellValue::from(NUM_ERROR), |b| CellValue::Number(b.value_per_share));
        let slot = self.assumptions.layout.value_per_share.clone();
        self.workbook.write(&slot, value)
    }
}

impl SensitivityModel for DcfWorkbook {
    type Error = ModelError;

    fn check_slots(&self) -> Result<()> {
        self.check_layout()
    }

    fn read_input(&self, input: Input) -> Result<f64> {
        self.workbook
            .read_number(self.assumptions.layout.slot(input))
    }

    fn write_input(&mut self, input: Input, value: f64) -> Result<()> {
        let slot = self.assumptions.layout.slot(input).clone();
        self.workbook.write(&slot, value)
    }

    fn recompute(&mut self) -> Result<()> {
        self.evaluate()
    }

    fn read_output(&self) -> Result<Option<f64>> {
        Ok(self
            .workbook
            .read(&self.assumptions.layout.value_per_share)?
            .as_number())
    }
}
