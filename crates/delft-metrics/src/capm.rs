//! CAPM cost of equity.

use serde::{Deserialize, Serialize};

/// Equity market risk premium used when none is given.
pub const DEFAULT_MARKET_RISK_PREMIUM: f64 = 0.065;

/// Cost of equity under CAPM: `re = rf + beta * mrp`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostOfEquity {
    /// Risk-free rate as a fraction.
    pub risk_free_rate: f64,
    /// Equity beta.
    pub beta: f64,
    /// Market risk premium as a fraction.
    pub market_risk_premium: f64,
}

impl CostOfEquity {
    /// Build from a risk-free rate and beta with the default premium.
    pub const fn new(risk_free_rate: f64, beta: f64) -> Self {
        Self {
            risk_free_rate,
            beta,
            market_risk_premium: DEFAULT_MARKET_RISK_PREMIUM,
        }
    }

    /// Build from a Treasury yield quoted in percent (`^TNX` closes at 4.25
    /// for 4.25%).
    pub fn from_treasury_yield(yield_percent: f64, beta: f64) -> Self {
        Self::new(yield_percent / 100.0, beta)
    }

    /// Override the market risk premium.
    pub const fn with_market_risk_premium(mut self, premium: f64) -> Self {
        self.market_risk_premium = premium;
        self
    }

    /// `rf + beta * mrp`.
    pub fn rate(&self) -> f64 {
        self.beta.mul_add(self.market_risk_premium, self.risk_free_rate)
    }

    /// Summary record.
    pub fn market_data(&self) -> MarketData {
        MarketData {
            risk_free_rate: self.risk_free_rate,
            market_risk_premium: self.market_risk_premium,
            beta: self.beta,
            cost_of_equity: self.rate(),
        }
    }
}

/// Market inputs to the discount rate, as saved alongside a valuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketData {
    /// Risk-free rate as a fraction.
    pub risk_free_rate: f64,
    /// Market risk premium as a fraction.
    pub market_risk_premium: f64,
    /// Equity beta.
    pub beta: f64,
    /// CAPM cost of equity as a fraction.
    pub cost_of_equity: f64,
}

impl std::fmt::Display for MarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Risk-free rate:       {:>7.2}%", self.risk_free_rate * 100.0)?;
        writeln!(f, "Market risk premium:  {:>7.2}%", self.market_risk_premium * 100.0)?;
        writeln!(f, "Beta:                 {:>8.3}", self.beta)?;
        write!(f, "Cost of equity:       {:>7.2}%", self.cost_of_equity * 100.0)
    }
}
