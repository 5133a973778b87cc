//! Performance statistics and single-factor regression.

use bab_math::{
    DEGENERATE_VARIANCE, HacConfig, max_drawdown, mean, newey_west_ols, sample_std,
    two_sided_p_value,
};
use bab_primitives::{PerformanceReport, RegressionSummary, TimeSeries, align};
use ndarray::{Array1, Array2};
use tracing::{debug, warn};

use crate::ModelError;

/// Evaluator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorConfig {
    /// Minimum aligned observations before the regression is attempted.
    pub min_regression_obs: usize,
    /// Newey-West settings.
    pub hac: HacConfig,
    /// Annualization factor; inferred from the strategy dates when `None`.
    pub periods_per_year: Option<u32>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self { min_regression_obs: 12, hac: HacConfig::default(), periods_per_year: None }
    }
}

/// Summarizes a strategy return series and regresses it on a benchmark.
#[derive(Debug, Clone, Default)]
pub struct FactorRegressionEvaluator {
    config: EvaluatorConfig,
}

impl FactorRegressionEvaluator {
    /// Create an evaluator with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an evaluator with custom settings.
    #[must_use]
    pub const fn with_config(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    /// Evaluator settings.
    #[must_use]
    pub const fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Build the performance report of `strategy`.
    ///
    /// Undefined entries are dropped first. The regression block is present
    /// only when a benchmark is given, enough aligned observations exist and
    /// the design is non-singular.
    ///
    /// # Errors
    /// Returns [`ModelError::NoData`] if `strategy` has no defined returns.
    pub fn evaluate(
        &self,
        strategy: &TimeSeries,
        benchmark: Option<&TimeSeries>,
    ) -> Result<PerformanceReport, ModelError> {
        let strategy = strategy.drop_undefined();
        let (Some(start), Some(end)) = (strategy.first_date(), strategy.last_date()) else {
            return Err(ModelError::NoData("strategy has no defined returns".to_string()));
        };

        let periods_per_year = self
            .config
            .periods_per_year
            .or_else(|| strategy.periods_per_year())
            .unwrap_or(12);
        let p = f64::from(periods_per_year);

        let returns = strategy.defined_values();
        let cumulative_return = returns.iter().map(|r| 1.0 + r).product::<f64>() - 1.0;
        let annualized_return = mean(&returns).unwrap_or(0.0) * p;
        let periodic_std = sample_std(&returns);
        let annualized_volatility = periodic_std.map(|s| s * p.sqrt());
        let sharpe_ratio = periodic_std
            .filter(|&s| s * s > DEGENERATE_VARIANCE)
            .map(|s| annualized_return / (s * p.sqrt()))
            .filter(|s| s.is_finite());

        let regression = benchmark.and_then(|b| self.regress(&strategy, b, p));

        debug!(
            observations = returns.len(),
            periods_per_year,
            regression = regression.is_some(),
            "evaluated strategy"
        );

        Ok(PerformanceReport {
            start,
            end,
            observations: returns.len(),
            periods_per_year,
            cumulative_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            max_drawdown: max_drawdown(&returns),
            regression,
        })
    }

    fn regress(
        &self,
        strategy: &TimeSeries,
        benchmark: &TimeSeries,
        periods_per_year: f64,
    ) -> Option<RegressionSummary> {
        let pairs: Vec<(f64, f64)> = align(strategy, benchmark)
            .into_iter()
            .filter_map(|(_, y, x)| Some((y?, x?)))
            .collect();
        let n = pairs.len();
        if n < self.config.min_regression_obs.max(3) {
            debug!(
                observations = n,
                required = self.config.min_regression_obs,
                "too few aligned observations for regression"
            );
            return None;
        }

        let y: Array1<f64> = pairs.iter().map(|&(y, _)| y).collect();
        let x = Array2::from_shape_fn((n, 2), |(i, j)| if j == 0 { 1.0 } else { pairs[i].1 });

        let hac = match newey_west_ols(&y, &x, self.config.hac) {
            Ok(hac) => hac,
            Err(e) => {
                warn!(error = %e, "factor regression failed");
                return None;
            }
        };

        let dof = (n - 2) as f64;
        let t_stat = |coef: f64, se: f64| (se > 0.0).then(|| coef / se).filter(|t| t.is_finite());

        let (alpha, beta) = (hac.ols.coefficients[0], hac.ols.coefficients[1]);
        let (alpha_se, beta_se) = (hac.std_errors[0], hac.std_errors[1]);
        let alpha_t_stat = t_stat(alpha, alpha_se);
        let beta_t_stat = t_stat(beta, beta_se);

        Some(RegressionSummary {
            observations: n,
            lags: hac.lags,
            alpha,
            annualized_alpha: alpha * periods_per_year,
            alpha_std_error: alpha_se,
            alpha_t_stat,
            alpha_p_value: alpha_t_stat.and_then(|t| two_sided_p_value(t, dof)),
            beta,
            beta_std_error: beta_se,
            beta_t_stat,
            beta_p_value: beta_t_stat.and_then(|t| two_sided_p_value(t, dof)),
            r_squared: hac.ols.r_squared,
        })
    }
}
