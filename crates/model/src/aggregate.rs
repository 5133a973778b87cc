//! Long/short portfolio returns from lagged group assignments.

use std::collections::{BTreeMap, BTreeSet};

use bab_math::mean;
use bab_primitives::{Date, GroupAssignment, ReturnSeries, Symbol, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ModelError;

/// What went into the strategy return of one holding period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodDiagnostics {
    /// Date of the assignment the legs were taken from.
    pub formed: Date,
    /// Date the return is realized.
    pub date: Date,
    /// Low-beta members with a defined return.
    pub long_count: usize,
    /// High-beta members with a defined return.
    pub short_count: usize,
    /// Members of either leg without a defined return.
    pub missing: usize,
}

impl PeriodDiagnostics {
    /// Both legs had at least one return.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.long_count > 0 && self.short_count > 0
    }
}

/// Strategy returns together with per-period diagnostics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedReturns {
    /// One entry per assignment after the first, dated at the later assignment.
    pub returns: TimeSeries,
    /// Diagnostics in the same order as `returns`.
    pub periods: Vec<PeriodDiagnostics>,
}

impl AggregatedReturns {
    /// Total group members without a return.
    #[must_use]
    pub fn missing_observations(&self) -> usize {
        self.periods.iter().map(|p| p.missing).sum()
    }

    /// Periods where a leg was empty.
    #[must_use]
    pub fn undefined_periods(&self) -> usize {
        self.periods.iter().filter(|p| !p.is_defined()).count()
    }
}

/// Equal-weighted long lowest group, short highest group.
///
/// The return dated `t` uses the groups formed at the previous rebalancing
/// date and the entity returns dated `t`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioReturnAggregator {
    leverage: f64,
}

impl Default for PortfolioReturnAggregator {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PortfolioReturnAggregator {
    /// Create an aggregator scaling the spread by `leverage`.
    #[must_use]
    pub const fn new(leverage: f64) -> Self {
        Self { leverage }
    }

    /// Leverage applied to the long-short spread.
    #[must_use]
    pub const fn leverage(&self) -> f64 {
        self.leverage
    }

    /// Aggregate entity returns over consecutive assignment pairs.
    ///
    /// # Errors
    /// Returns [`ModelError::InvalidInput`] if assignment dates are not
    /// strictly ascending or [`ModelError::InvalidConfig`] for a
    /// non-positive leverage.
    pub fn aggregate(
        &self,
        returns: &BTreeMap<Symbol, ReturnSeries>,
        assignments: &[GroupAssignment],
    ) -> Result<AggregatedReturns, ModelError> {
        if !self.leverage.is_finite() || self.leverage <= 0.0 {
            return Err(ModelError::InvalidConfig(format!(
                "leverage must be positive, got {}",
                self.leverage
            )));
        }
        if let Some(pair) = assignments.windows(2).find(|w| w[0].date() >= w[1].date()) {
            return Err(ModelError::InvalidInput(format!(
                "assignments out of order: {} then {}",
                pair[0].date(),
                pair[1].date()
            )));
        }

        let mut out = AggregatedReturns::default();
        let mut points = Vec::with_capacity(assignments.len().saturating_sub(1));

        for pair in assignments.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let date = curr.date();

            let (long, long_missing) = leg_returns(returns, prev.lowest(), date);
            let (short, short_missing) = leg_returns(returns, prev.highest(), date);

            let value = match (mean(&long), mean(&short)) {
                (Some(low), Some(high)) => Some(self.leverage * (low - high)),
                _ => None,
            };

            let period = PeriodDiagnostics {
                formed: prev.date(),
                date,
                long_count: long.len(),
                short_count: short.len(),
                missing: long_missing + short_missing,
            };
            if period.missing > 0 {
                debug!(
                    formed = %period.formed,
                    %date,
                    missing = period.missing,
                    "group members without a return"
                );
            }
            if value.is_none() {
                debug!(%date, long = period.long_count, short = period.short_count, "empty leg");
            }

            points.push((date, value));
            out.periods.push(period);
        }

        out.returns = points.into_iter().collect();
        Ok(out)
    }
}

/// Defined returns of `members` at `date`, and how many members had none.
fn leg_returns(
    returns: &BTreeMap<Symbol, ReturnSeries>,
    members: &BTreeSet<Symbol>,
    date: Date,
) -> (Vec<f64>, usize) {
    let values: Vec<f64> =
        members.iter().filter_map(|s| returns.get(s).and_then(|r| r.get(date))).collect();
    let missing = members.len() - values.len();
    (values, missing)
}
