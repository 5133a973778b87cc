//! Strategy configuration.

use std::{fmt, str::FromStr};

use bab_primitives::Date;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// How often the portfolio is re-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    /// Once per calendar month.
    #[default]
    Monthly,
}

impl RebalanceFrequency {
    /// Rebalancing periods in a year.
    #[must_use]
    pub const fn periods_per_year(self) -> u32 {
        match self {
            Self::Monthly => 12,
        }
    }
}

impl fmt::Display for RebalanceFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl FromStr for RebalanceFrequency {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "month" | "m" => Ok(Self::Monthly),
            other => Err(ModelError::InvalidConfig(format!(
                "rebalancing frequency `{other}` is not implemented (only `monthly`)"
            ))),
        }
    }
}

/// Parameters of one strategy run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// First date considered, inclusive.
    pub start: Date,
    /// Last date considered, inclusive.
    pub end: Date,
    /// Rolling beta window in periods (months).
    pub window: usize,
    /// Optional cap on the number of entities.
    pub max_universe: Option<usize>,
    /// Annual risk-free rate as a decimal.
    pub annual_risk_free: f64,
    /// Multiplier applied to the long-short spread.
    pub leverage: f64,
    /// Rebalancing frequency.
    pub rebalance: RebalanceFrequency,
    /// Number of beta groups.
    pub n_groups: usize,
    /// Minimum aligned observations for the factor regression.
    pub min_regression_obs: usize,
    /// Fixed Newey-West lag truncation (rule of thumb when `None`).
    pub newey_west_lags: Option<usize>,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            start: Date::from_ymd_opt(2010, 1, 1).unwrap_or_default(),
            end: Date::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            window: 36,
            max_universe: None,
            annual_risk_free: 0.02,
            leverage: 1.0,
            rebalance: RebalanceFrequency::Monthly,
            n_groups: 5,
            min_regression_obs: 12,
            newey_west_lags: None,
        }
    }
}

impl StrategyConfig {
    /// Check every parameter before any computation starts.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidConfig`] naming the first invalid parameter.
    pub fn validate(&self) -> Result<(), ModelError> {
        let invalid = |msg: String| Err(ModelError::InvalidConfig(msg));

        if self.start >= self.end {
            return invalid(format!("start {} must precede end {}", self.start, self.end));
        }
        // A single observation cannot define a slope.
        if self.window < 2 {
            return invalid(format!("window must be at least 2 periods, got {}", self.window));
        }
        if self.max_universe == Some(0) {
            return invalid("max_universe must be positive when set".to_string());
        }
        if !self.annual_risk_free.is_finite() || self.annual_risk_free.abs() >= 1.0 {
            return invalid(format!(
                "annual_risk_free must be a decimal in (-1, 1), got {}",
                self.annual_risk_free
            ));
        }
        if !self.leverage.is_finite() || self.leverage <= 0.0 {
            return invalid(format!("leverage must be positive, got {}", self.leverage));
        }
        if self.n_groups < 2 {
            return invalid(format!("n_groups must be at least 2, got {}", self.n_groups));
        }
        if self.min_regression_obs < 3 {
            return invalid(format!(
                "min_regression_obs must be at least 3, got {}",
                self.min_regression_obs
            ));
        }
        Ok(())
    }

    /// Risk-free rate per rebalancing period.
    #[must_use]
    pub fn periodic_risk_free(&self) -> f64 {
        self.annual_risk_free / f64::from(self.rebalance.periods_per_year())
    }
}
