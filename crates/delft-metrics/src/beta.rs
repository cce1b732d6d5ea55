//! Market beta from monthly returns.
//!
//! ```text
//! beta = cov(r_stock, r_benchmark) / var(r_benchmark)
//! ```
//!
//! Both moments use the sample (n - 1) estimator, so the ratio is the OLS
//! slope of stock returns on benchmark returns.

use crate::error::{MetricsError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for beta estimation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetaConfig {
    /// Years of monthly history to regress over (default: 2)
    pub lookback_years: u32,
    /// Benchmark symbol (default: "SPY")
    pub benchmark: String,
    /// Minimum aligned return pairs (default: 3)
    pub min_observations: usize,
}

impl Default for BetaConfig {
    fn default() -> Self {
        Self {
            lookback_years: 2,
            benchmark: "SPY".to_string(),
            min_observations: 3,
        }
    }
}

/// Result of a beta regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaEstimate {
    /// Slope of stock returns on benchmark returns.
    pub beta: f64,
    /// Aligned return pairs used.
    pub observations: usize,
    /// Sample covariance of the two return series.
    pub covariance: f64,
    /// Sample variance of benchmark returns.
    pub benchmark_variance: f64,
}

/// Period returns of a `[date, close]` frame, named `alias`.
///
/// Rows are sorted by date; the first period, which has no prior close, is
/// dropped.
pub fn monthly_returns(closes: LazyFrame, alias: &str) -> LazyFrame {
    closes
        .sort(["date"], SortMultipleOptions::default())
        .with_column((col("close") / col("close").shift(lit(1)) - lit(1.0)).alias(alias))
        .filter(col(alias).is_not_null())
        .select([col("date"), col(alias)])
}

/// Estimate beta from two `[date, close]` frames.
///
/// Returns are inner-joined on date, so only months present in both series
/// count.
///
/// # Errors
///
/// Returns an error if a frame lacks `date` or `close`, if fewer than
/// `config.min_observations` pairs align, or if the benchmark is flat.
pub fn estimate_beta(
    stock: &DataFrame,
    benchmark: &DataFrame,
    config: &BetaConfig,
) -> Result<BetaEstimate> {
    for df in [stock, benchmark] {
        for name in ["date", "close"] {
            df.column(name)
                .map_err(|_| MetricsError::MissingColumn(name.to_string()))?;
        }
    }

    let joined = monthly_returns(stock.clone().lazy(), "stock_return")
        .join(
            monthly_returns(benchmark.clone().lazy(), "benchmark_return"),
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Inner),
        )
        .sort(["date"], SortMultipleOptions::default())
        .collect()?;

    let stock_returns = joined.column("stock_return")?.f64()?;
    let benchmark_returns = joined.column("benchmark_return")?.f64()?;
    let (xs, ys): (Vec<f64>, Vec<f64>) = stock_returns
        .into_iter()
        .zip(benchmark_returns)
        .filter_map(|(s, b)| Some((s?, b?)))
        .filter(|(s, b)| s.is_finite() && b.is_finite())
        .unzip();

    beta_from_returns(&xs, &ys, config.min_observations)
}

/// Beta of `stock` on `benchmark` from already aligned return pairs.
///
/// # Errors
///
/// Returns [`MetricsError::InsufficientData`] with fewer than
/// `max(min_observations, 2)` pairs and [`MetricsError::DegenerateBenchmark`]
/// when the benchmark has zero variance.
pub fn beta_from_returns(
    stock: &[f64],
    benchmark: &[f64],
    min_observations: usize,
) -> Result<BetaEstimate> {
    if stock.len() != benchmark.len() {
        return Err(MetricsError::InvalidInput(format!(
            "return series differ in length: {} vs {}",
            stock.len(),
            benchmark.len()
        )));
    }

    let n = stock.len();
    let needed = min_observations.max(2);
    if n < needed {
        return Err(MetricsError::InsufficientData { needed, found: n });
    }

    let mean = |v: &[f64]| v.iter().sum::<f64>() / n as f64;
    let (ms, mb) = (mean(stock), mean(benchmark));
    let denom = (n - 1) as f64;
    let covariance = stock
        .iter()
        .zip(benchmark)
        .map(|(s, b)| (s - ms) * (b - mb))
        .sum::<f64>()
        / denom;
    let benchmark_variance = benchmark.iter().map(|b| (b - mb).powi(2)).sum::<f64>() / denom;

    if benchmark_variance <= f64::EPSILON * f64::EPSILON {
        return Err(MetricsError::DegenerateBenchmark);
    }

    Ok(BetaEstimate {
        beta: covariance / benchmark_variance,
        observations: n,
        covariance,
        benchmark_variance,
    })
}
