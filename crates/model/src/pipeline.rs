//! End-to-end strategy run.

use std::collections::BTreeMap;

use bab_math::HacConfig;
use bab_primitives::{
    BetaSeries, GroupAssignment, PerformanceReport, RunSummary, Symbol, TimeSeries,
};
use bab_traits::AcquiredUniverse;
use tracing::{info, warn};

use crate::{
    CrossSectionalRanker, EvaluatorConfig, FactorRegressionEvaluator, ModelError,
    PortfolioReturnAggregator, RollingBetaEstimator, StrategyConfig,
};

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Rolling beta per entity.
    pub betas: BTreeMap<Symbol, BetaSeries>,
    /// Group assignments in ascending date order.
    pub assignments: Vec<GroupAssignment>,
    /// Long-short strategy returns.
    pub strategy: TimeSeries,
    /// Benchmark returns in excess of the risk-free rate.
    pub benchmark_excess: TimeSeries,
    /// Performance report; `None` when the strategy has no defined return.
    pub report: Option<PerformanceReport>,
    /// Counts of processed and skipped work.
    pub summary: RunSummary,
}

impl PipelineOutput {
    /// Wealth curve of the strategy starting from 1.0.
    #[must_use]
    pub fn strategy_wealth(&self) -> TimeSeries {
        self.strategy.cumulative_wealth()
    }

    /// Wealth curve of the benchmark over the strategy's dates.
    #[must_use]
    pub fn benchmark_wealth(&self) -> TimeSeries {
        match (self.strategy.first_date(), self.strategy.last_date()) {
            (Some(start), Some(end)) => {
                self.benchmark_excess.between(start, end).cumulative_wealth()
            }
            _ => TimeSeries::new(),
        }
    }
}

/// Runs beta estimation, ranking, aggregation and evaluation for one
/// validated configuration.
#[derive(Debug, Clone)]
pub struct BabPipeline {
    config: StrategyConfig,
}

impl BabPipeline {
    /// Create a pipeline after validating `config`.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: StrategyConfig) -> Result<Self, ModelError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Strategy configuration.
    #[must_use]
    pub const fn config(&self) -> &StrategyConfig {
        &self.config
    }

    /// Run the strategy over an acquired universe.
    ///
    /// Local failures (dates with too few betas, periods with an empty leg,
    /// too little data for a report) are counted in the summary instead of
    /// aborting.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] when there is no entity or no
    /// benchmark data inside the configured date range.
    pub fn run(&self, universe: &AcquiredUniverse) -> Result<PipelineOutput, ModelError> {
        let config = &self.config;
        let mut summary = RunSummary {
            entities_requested: universe.requested().max(universe.returns.len()),
            entities_resolved: universe.returns.len(),
            entities_failed: universe.failed.len(),
            ..RunSummary::default()
        };

        let cap = config.max_universe.unwrap_or(usize::MAX);
        summary.entities_capped = universe.returns.len().saturating_sub(cap);

        let rf = config.periodic_risk_free();
        let returns: BTreeMap<Symbol, TimeSeries> = universe
            .returns
            .iter()
            .take(cap)
            .map(|(symbol, series)| {
                (symbol.clone(), series.between(config.start, config.end).excess_over(rf))
            })
            .collect();
        if returns.is_empty() {
            return Err(ModelError::InvalidInput("no entities to evaluate".to_string()));
        }

        let benchmark_excess = universe.benchmark.between(config.start, config.end).excess_over(rf);
        if benchmark_excess.count_defined() == 0 {
            return Err(ModelError::InvalidInput(format!(
                "benchmark has no returns between {} and {}",
                config.start, config.end
            )));
        }
        info!(
            entities = returns.len(),
            capped = summary.entities_capped,
            failed = summary.entities_failed,
            "universe prepared"
        );

        let betas =
            RollingBetaEstimator::new(config.window).estimate_all(&returns, &benchmark_excess);
        summary.entities_with_beta = betas.values().filter(|b| b.count_defined() > 0).count();
        info!(
            window = config.window,
            with_beta = summary.entities_with_beta,
            without_beta = returns.len() - summary.entities_with_beta,
            "estimated rolling betas"
        );

        let panel = CrossSectionalRanker::new(config.n_groups).rank_panel(&betas)?;
        summary.dates_ranked = panel.assignments.len();
        summary.dates_skipped = panel.skipped.len();
        summary.rebalance_dates = summary.dates_ranked + summary.dates_skipped;
        info!(
            ranked = summary.dates_ranked,
            skipped = summary.dates_skipped,
            groups = config.n_groups,
            "ranked rebalancing dates"
        );

        let aggregator = PortfolioReturnAggregator::new(config.leverage);
        let aggregated = aggregator.aggregate(&returns, &panel.assignments)?;
        summary.periods_undefined = aggregated.undefined_periods();
        summary.periods_aggregated = aggregated.periods.len() - summary.periods_undefined;
        summary.missing_observations = aggregated.missing_observations();
        info!(
            periods = summary.periods_aggregated,
            undefined = summary.periods_undefined,
            missing = summary.missing_observations,
            "aggregated strategy returns"
        );

        let evaluator = FactorRegressionEvaluator::with_config(EvaluatorConfig {
            min_regression_obs: config.min_regression_obs,
            hac: HacConfig { lags: config.newey_west_lags, ..HacConfig::default() },
            periods_per_year: Some(config.rebalance.periods_per_year()),
        });
        let report = match evaluator.evaluate(&aggregated.returns, Some(&benchmark_excess)) {
            Ok(report) => Some(report),
            Err(e) if e.is_recoverable() => {
                warn!(error = %e, "no performance report");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(PipelineOutput {
            betas,
            assignments: panel.assignments,
            strategy: aggregated.returns,
            benchmark_excess,
            report,
            summary,
        })
    }
}
