//! Delft CLI binary.
//!
//! Collects statements, peer multiples and market inputs for a company, and
//! runs two-way sensitivity sweeps over a DCF workbook.

mod integration;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use delft::PeerGroup;
use delft_data::{FmpClient, StatementKind, YahooQuoteProvider};
use delft_grid::{Axis, Evaluator, MissingPolicy};
use delft_metrics::{
    BetaConfig, Comparables, CostOfEquity, DEFAULT_MARKET_RISK_PREMIUM, FinancialMetrics,
    StatementTable, estimate_beta,
};
use delft_model::{CellRef, DcfWorkbook, Driver};
use delft_output::{
    DEFAULT_ORIGIN, ExportFormat, Exporter, HeatMap, ReportBuilder, SensitivitySummary,
    percent_label, valuation_waterfall, write_table,
};
use integration::environment::{init_logging, load_env, output_dir, output_file};
use integration::fetch::{
    TREASURY_SYMBOL, fetch_monthly_pair, fetch_peer_snapshots, fetch_statements, lookback,
};
use integration::progress::{SweepBar, styled_bar};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process;

/// Sheet the sweep results are written into.
const SENSITIVITY_SHEET: &str = "Sensitivity";

#[derive(Parser)]
#[command(name = "delft")]
#[command(about = "Delft: DCF valuation and sensitivity toolkit", long_about = None)]
#[command(version)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch annual statements and compute financial metrics
    Collect {
        /// Stock symbol
        symbol: String,

        /// Fiscal years to fetch
        #[arg(long, default_value = "5")]
        years: u32,

        /// Output directory (default: $DELFT_OUTPUT_DIR or ./outputs)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Build a comparables table for a peer group
    Peers {
        /// Peer symbols (default: ASML AMAT LRCX KLAC)
        symbols: Vec<String>,

        /// Output directory (default: $DELFT_OUTPUT_DIR or ./outputs)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Risk-free rate, beta and CAPM cost of equity
    Market {
        /// Stock symbol
        symbol: String,

        /// Benchmark for beta
        #[arg(long, default_value = "SPY")]
        benchmark: String,

        /// Years of monthly returns
        #[arg(long, default_value = "2")]
        years: u32,

        /// Market risk premium as a fraction
        #[arg(long, default_value_t = DEFAULT_MARKET_RISK_PREMIUM)]
        mrp: f64,

        /// Output directory (default: $DELFT_OUTPUT_DIR or ./outputs)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Sweep WACC against terminal growth over a DCF model
    Sensitivity {
        /// DCF assumptions (JSON)
        #[arg(long)]
        model: PathBuf,

        /// WACC values, comma separated (default: 8.0% to 13.0% in 0.5% steps)
        #[arg(long, value_delimiter = ',')]
        wacc: Vec<f64>,

        /// Terminal growth values, comma separated (default: 1.5% to 5.0% in 0.5% steps)
        #[arg(long, value_delimiter = ',')]
        growth: Vec<f64>,

        /// Base-case WACC to highlight
        #[arg(long, default_value = "0.095")]
        base_wacc: f64,

        /// Base-case terminal growth to highlight
        #[arg(long, default_value = "0.025")]
        base_growth: f64,

        /// Top-left cell of the values in the Sensitivity sheet
        #[arg(long, default_value_t = DEFAULT_ORIGIN)]
        origin: CellRef,

        /// What to do when a scenario has no finite value
        #[arg(long, value_enum, default_value = "abort")]
        on_missing: OnMissing,

        /// Output directory (default: $DELFT_OUTPUT_DIR or ./outputs)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnMissing {
    /// Stop the sweep and restore the model
    Abort,
    /// Leave the cell empty and continue
    Mark,
}

impl From<OnMissing> for MissingPolicy {
    fn from(value: OnMissing) -> Self {
        match value {
            OnMissing::Abort => Self::Abort,
            OnMissing::Mark => Self::Mark,
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let env_files = load_env();
    init_logging(cli.verbose);
    for path in &env_files {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    match cli.command {
        Commands::Collect {
            symbol,
            years,
            out,
        } => {
            collect_statements(&symbol, years, output_dir(out)?).await?;
        }
        Commands::Peers { symbols, out } => {
            collect_peers(&symbols, output_dir(out)?).await?;
        }
        Commands::Market {
            symbol,
            benchmark,
            years,
            mrp,
            out,
        } => {
            market_data(&symbol, &benchmark, years, mrp, output_dir(out)?).await?;
        }
        Commands::Sensitivity {
            model,
            wacc,
            growth,
            base_wacc,
            base_growth,
            origin,
            on_missing,
            out,
        } => {
            let request = SweepRequest {
                model,
                wacc,
                growth,
                base: (base_wacc, base_growth),
                origin,
                policy: on_missing.into(),
            };
            run_sensitivity(&request, &output_dir(out)?)?;
        }
    }

    Ok(())
}

fn banner(title: &str) {
    let rule = "═".repeat(62);
    println!("\n╔{rule}╗");
    println!("║{:^62}║", title);
    println!("╚{rule}╝\n");
}

fn section(title: &str) {
    let rule = "━".repeat(64);
    println!("{rule}");
    println!("{title}");
    println!("{rule}\n");
}

fn status(message: &str) -> anyhow::Result<()> {
    print!("{message}...");
    std::io::Write::flush(&mut std::io::stdout())?;
    Ok(())
}

fn save_csv(item: &impl Exporter, dir: &Path, stem: &str) -> anyhow::Result<PathBuf> {
    let path = output_file(dir, stem, ExportFormat::Csv.extension());
    item.export_to_file(&path, ExportFormat::Csv)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

async fn collect_statements(symbol: &str, years: u32, out_dir: PathBuf) -> anyhow::Result<()> {
    let symbol = symbol.to_uppercase();
    banner(&format!("FINANCIAL STATEMENTS: {}", symbol));

    let client = FmpClient::from_env()?;

    status("Fetching income statement, balance sheet and cash flow")?;
    let statements = match fetch_statements(&client, &symbol, years).await {
        Ok(s) => {
            println!(" ✓ ({} periods)", s.periods());
            s
        }
        Err(e) => {
            println!(" ✗");
            return Err(e).context(format!("Failed to fetch statements for {}", symbol));
        }
    };

    status("Building statement tables")?;
    let income = StatementTable::income(&statements.income);
    let balance = StatementTable::balance(&statements.balance);
    let cash_flow = StatementTable::cash_flow(&statements.cash_flow);
    let metrics = FinancialMetrics::compute(&income, &cash_flow);
    println!(" ✓ ({} fiscal years)", income.years().len());
    println!();

    for table in [&income, &balance, &cash_flow] {
        println!("{table}");
    }
    println!("{metrics}");

    section("DATA QUALITY CHECK");
    let mut complete = true;
    for table in [&income, &balance, &cash_flow] {
        let missing = table.missing_cells();
        if missing.is_empty() {
            println!("  {:30} complete", table.title());
            continue;
        }
        complete = false;
        println!("  {:30} {} missing value(s)", table.title(), missing.len());
        for (label, year) in missing {
            println!("    - {} ({})", label, year);
        }
    }
    if complete {
        println!("\n  All line items present.");
    }
    println!();

    let stem = symbol.to_lowercase();
    let outputs = [
        (StatementKind::Income, &income),
        (StatementKind::Balance, &balance),
        (StatementKind::CashFlow, &cash_flow),
    ];
    for (kind, table) in outputs {
        let path = save_csv(table, &out_dir, &format!("{}_{}", stem, kind.file_stem()))?;
        println!("Saved {}", path.display());
    }
    let path = save_csv(&metrics, &out_dir, &format!("{}_metrics", stem))?;
    println!("Saved {}", path.display());

    Ok(())
}

async fn collect_peers(symbols: &[String], out_dir: PathBuf) -> anyhow::Result<()> {
    let group = if symbols.is_empty() {
        PeerGroup::default()
    } else {
        PeerGroup::from_symbols("Custom", symbols)
    };
    if group.is_empty() {
        bail!("No peer symbols given");
    }

    banner(&format!("COMPARABLES: {}", group.name.to_uppercase()));

    let client = FmpClient::from_env()?;

    let pb = styled_bar(group.len() as u64, "Fetching peer snapshots...")?;
    let snapshots = fetch_peer_snapshots(&client, &group.symbols(), Some(&pb)).await;
    pb.finish_with_message(format!(
        "Fetched {} of {} peers",
        snapshots.len(),
        group.len()
    ));

    if snapshots.is_empty() {
        bail!("No peer snapshots could be fetched");
    }

    let comparables = Comparables::from_snapshots(&snapshots);
    println!("\n{comparables}");

    let path = save_csv(&comparables, &out_dir, "comparables")?;
    println!("Saved {}", path.display());

    Ok(())
}

async fn market_data(
    symbol: &str,
    benchmark: &str,
    years: u32,
    premium: f64,
    out_dir: PathBuf,
) -> anyhow::Result<()> {
    let symbol = symbol.to_uppercase();
    banner(&format!("MARKET DATA: {}", symbol));

    let provider = YahooQuoteProvider::new()?;

    status(&format!("Fetching risk-free rate ({})", TREASURY_SYMBOL))?;
    let treasury_yield = match provider.latest_close(TREASURY_SYMBOL).await {
        Ok(y) => {
            println!(" ✓ ({:.2}%)", y);
            y
        }
        Err(e) => {
            println!(" ✗");
            return Err(e).context("Failed to fetch the Treasury yield");
        }
    };

    status(&format!(
        "Fetching {} years of monthly closes for {} and {}",
        years, symbol, benchmark
    ))?;
    let (start, end) = lookback(years, Utc::now());
    let (stock, bench) = match fetch_monthly_pair(&provider, &symbol, benchmark, start, end).await
    {
        Ok(pair) => {
            println!(" ✓");
            pair
        }
        Err(e) => {
            println!(" ✗");
            return Err(e).context(format!("Failed to fetch monthly closes for {}", symbol));
        }
    };

    status("Estimating beta")?;
    let config = BetaConfig {
        lookback_years: years,
        benchmark: benchmark.to_string(),
        ..BetaConfig::default()
    };
    let estimate = match estimate_beta(&stock, &bench, &config) {
        Ok(estimate) => {
            println!(" ✓ ({} monthly observations)", estimate.observations);
            estimate
        }
        Err(e) => {
            println!(" ✗");
            return Err(e).context(format!("Beta estimation failed for {}", symbol));
        }
    };

    let data = CostOfEquity::from_treasury_yield(treasury_yield, estimate.beta)
        .with_market_risk_premium(premium)
        .market_data();

    println!();
    section("COST OF EQUITY (CAPM)");
    println!("{data}\n");

    let path = save_csv(&data, &out_dir, "market_data")?;
    println!("Saved {}", path.display());

    Ok(())
}

/// Inputs to a `sensitivity` run.
struct SweepRequest {
    model: PathBuf,
    wacc: Vec<f64>,
    growth: Vec<f64>,
    /// `(wacc, terminal growth)` to highlight.
    base: (f64, f64),
    origin: CellRef,
    policy: MissingPolicy,
}

fn wacc_axis(values: &[f64]) -> anyhow::Result<Axis> {
    let axis = if values.is_empty() {
        Axis::stepped("WACC", 0.08, 0.13, 0.005)?
    } else {
        Axis::new("WACC", values.to_vec())?
    };
    Ok(axis)
}

fn growth_axis(values: &[f64]) -> anyhow::Result<Axis> {
    let axis = if values.is_empty() {
        Axis::stepped("Terminal growth", 0.015, 0.05, 0.005)?
    } else {
        Axis::new("Terminal growth", values.to_vec())?
    };
    Ok(axis)
}

fn run_sensitivity(request: &SweepRequest, out_dir: &Path) -> anyhow::Result<()> {
    let mut model = DcfWorkbook::from_json_file(&request.model)
        .with_context(|| format!("Failed to load {}", request.model.display()))?;
    let company = model.assumptions().company.clone();
    let currency = model.assumptions().currency.clone();

    banner(&format!("SENSITIVITY ANALYSIS: {}", company));

    let (base_wacc, base_growth) = request.base;
    let wacc = wacc_axis(&request.wacc)?;
    let growth = growth_axis(&request.growth)?;
    let (rows, columns, base) = match model.assumptions().layout.rows {
        Driver::TerminalGrowth => (growth, wacc, (base_growth, base_wacc)),
        Driver::Wacc => (wacc, growth, (base_wacc, base_growth)),
    };

    println!(
        "Rows:    {} ({} values, {} to {})",
        rows.label(),
        rows.len(),
        percent_label(rows.values()[0]),
        percent_label(rows.values()[rows.len() - 1])
    );
    println!(
        "Columns: {} ({} values, {} to {})",
        columns.label(),
        columns.len(),
        percent_label(columns.values()[0]),
        percent_label(columns.values()[columns.len() - 1])
    );
    println!(
        "Baseline: WACC {}, terminal growth {}",
        percent_label(model.wacc()?),
        percent_label(model.terminal_growth()?)
    );
    println!();

    let evaluator = Evaluator::new(rows, columns).missing_policy(request.policy);
    let pb = styled_bar(evaluator.total() as u64, "Evaluating scenarios...")?;
    let mut observer = SweepBar::new(&pb);
    let matrix = match evaluator.run(&mut model, &mut observer) {
        Ok(m) => {
            pb.finish_with_message(format!("Evaluated {} scenarios", evaluator.total()));
            m
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e).context("Sensitivity sweep failed");
        }
    };

    println!(
        "Baseline restored: WACC {}, terminal growth {}",
        percent_label(model.wacc()?),
        percent_label(model.terminal_growth()?)
    );

    status(&format!("Writing table to '{}'!{}", SENSITIVITY_SHEET, request.origin))?;
    let sheet = model.workbook_mut().sheet_mut(SENSITIVITY_SHEET)?;
    let written = write_table(sheet, request.origin, &matrix)?;
    println!(" ✓ ({} cells)", written);
    println!();

    println!("{}", HeatMap::new(&matrix).with_base_case(base.0, base.1));

    let summary = SensitivitySummary::new(format!("{} value per share", company), &matrix, Some(base));
    println!("{}", summary.to_ascii_table());

    let breakdown = model.valuation().copied();
    match &breakdown {
        Some(b) => println!("{}", valuation_waterfall(b, &currency)),
        None => println!("No finite valuation at the baseline inputs."),
    }
    println!();

    let matrix_path = save_csv(&matrix, out_dir, "sensitivity")?;
    println!("Saved {}", matrix_path.display());
    let sheet_path = save_csv(
        model.workbook().sheet(SENSITIVITY_SHEET)?,
        out_dir,
        "sensitivity_workbook",
    )?;
    println!("Saved {}", sheet_path.display());

    let report_path = output_file(out_dir, "sensitivity_report", ExportFormat::Json.extension());
    let report = ReportBuilder::new()
        .subject(company)
        .command("sensitivity")
        .output(&matrix_path)
        .output(&sheet_path)
        .contents(json!({
            "model": request.model.display().to_string(),
            "missing_policy": request.policy,
            "origin": request.origin.to_string(),
            "summary": summary,
            "baseline": breakdown,
            "matrix": matrix,
        }))
        .build()?;
    report.write_to_file(&report_path)?;
    println!("Saved {}", report_path.display());

    Ok(())
}
