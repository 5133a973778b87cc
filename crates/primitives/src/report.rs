//! Performance report value types.

use serde::{Deserialize, Serialize};

use crate::Date;

/// Single-factor regression of strategy returns on benchmark returns.
///
/// Standard errors are heteroskedasticity and autocorrelation consistent.
/// Statistics that would divide by a zero standard error are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionSummary {
    /// Aligned observations used in the fit.
    pub observations: usize,
    /// Lag truncation used for the long-run variance.
    pub lags: usize,
    /// Intercept per period.
    pub alpha: f64,
    /// Intercept scaled to a year.
    pub annualized_alpha: f64,
    /// Standard error of the intercept.
    pub alpha_std_error: f64,
    /// t-statistic of the intercept.
    pub alpha_t_stat: Option<f64>,
    /// Two-sided p-value of the intercept.
    pub alpha_p_value: Option<f64>,
    /// Slope on the benchmark.
    pub beta: f64,
    /// Standard error of the slope.
    pub beta_std_error: f64,
    /// t-statistic of the slope.
    pub beta_t_stat: Option<f64>,
    /// Two-sided p-value of the slope.
    pub beta_p_value: Option<f64>,
    /// Coefficient of determination.
    pub r_squared: f64,
}

/// Summary statistics of a strategy return series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// First date with a defined return.
    pub start: Date,
    /// Last date with a defined return.
    pub end: Date,
    /// Number of defined returns.
    pub observations: usize,
    /// Periods per year used for annualization.
    pub periods_per_year: u32,
    /// Product of `1 + r` minus one.
    pub cumulative_return: f64,
    /// Arithmetic mean return scaled to a year.
    pub annualized_return: f64,
    /// Sample standard deviation scaled to a year; `None` below two observations.
    pub annualized_volatility: Option<f64>,
    /// Annualized return over annualized volatility; `None` when volatility is zero.
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough decline of the wealth curve, as a fraction of the peak.
    pub max_drawdown: f64,
    /// Regression against the benchmark, when enough aligned data exists.
    pub regression: Option<RegressionSummary>,
}

/// What a pipeline run processed and what it skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Entities asked of the data provider.
    pub entities_requested: usize,
    /// Entities with a return series.
    pub entities_resolved: usize,
    /// Entities the provider could not materialize.
    pub entities_failed: usize,
    /// Entities excluded by the universe cap.
    pub entities_capped: usize,
    /// Entities with at least one defined beta.
    pub entities_with_beta: usize,
    /// Candidate rebalancing dates.
    pub rebalance_dates: usize,
    /// Dates that produced a group assignment.
    pub dates_ranked: usize,
    /// Dates skipped for too few defined betas.
    pub dates_skipped: usize,
    /// Periods with a defined strategy return.
    pub periods_aggregated: usize,
    /// Periods whose long or short leg had no returns.
    pub periods_undefined: usize,
    /// Group members without a return in the holding period.
    pub missing_observations: usize,
}

impl RunSummary {
    /// Resolved entities that never produced a defined beta.
    #[must_use]
    pub const fn entities_without_beta(&self) -> usize {
        self.entities_resolved.saturating_sub(self.entities_capped + self.entities_with_beta)
    }
}
