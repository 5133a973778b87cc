//! Cross-sectional quantile ranking.

use std::collections::{BTreeMap, BTreeSet};

use bab_math::{bin_index, quantile_breakpoints};
use bab_primitives::{BetaSeries, Date, GroupAssignment, Symbol};
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::ModelError;

/// Values of every entity at one date; `None` marks an undefined value.
#[must_use]
pub fn cross_section(
    series: &BTreeMap<Symbol, BetaSeries>,
    date: Date,
) -> BTreeMap<Symbol, Option<f64>> {
    series.iter().map(|(symbol, s)| (symbol.clone(), s.get(date))).collect()
}

/// Group assignments over a panel of dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedPanel {
    /// Assignments in ascending date order.
    pub assignments: Vec<GroupAssignment>,
    /// Dates left unranked, with the number of valid values found there.
    pub skipped: Vec<(Date, usize)>,
}

/// Splits a cross-section of values into `n_groups` quantile groups.
///
/// Breakpoints are linear-interpolation quantiles of the valid values and
/// bins are right-closed, so an entity sitting on a breakpoint falls into the
/// lower group. Entities with an undefined value are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossSectionalRanker {
    n_groups: usize,
}

impl Default for CrossSectionalRanker {
    fn default() -> Self {
        Self::new(5)
    }
}

impl CrossSectionalRanker {
    /// Create a ranker producing `n_groups` groups.
    #[must_use]
    pub const fn new(n_groups: usize) -> Self {
        Self { n_groups }
    }

    /// Number of groups.
    #[must_use]
    pub const fn n_groups(&self) -> usize {
        self.n_groups
    }

    /// Rank one cross-section.
    ///
    /// # Errors
    /// Returns [`ModelError::InsufficientData`] when fewer valid values than
    /// groups are available, or [`ModelError::InvalidConfig`] for fewer than
    /// two groups.
    pub fn rank(
        &self,
        date: Date,
        values: &BTreeMap<Symbol, Option<f64>>,
    ) -> Result<GroupAssignment, ModelError> {
        if self.n_groups < 2 {
            return Err(ModelError::InvalidConfig(format!(
                "ranking needs at least 2 groups, got {}",
                self.n_groups
            )));
        }

        let valid: Vec<(&Symbol, f64)> = values
            .iter()
            .filter_map(|(symbol, value)| value.filter(|v| v.is_finite()).map(|v| (symbol, v)))
            .collect();
        if valid.len() < self.n_groups {
            return Err(ModelError::InsufficientData {
                required: self.n_groups,
                actual: valid.len(),
            });
        }

        let sample: Vec<f64> = valid.iter().map(|&(_, v)| v).collect();
        let breaks = quantile_breakpoints(&sample, self.n_groups)?;

        let mut groups = vec![BTreeSet::new(); self.n_groups];
        for (symbol, value) in valid {
            groups[bin_index(value, &breaks)].insert(symbol.clone());
        }

        Ok(GroupAssignment::new(date, groups)?)
    }

    /// Rank every date appearing in any series of the panel.
    ///
    /// Dates with too few valid values are skipped and reported rather than
    /// failing the whole panel.
    ///
    /// # Errors
    /// Returns an error only for failures other than insufficient data.
    pub fn rank_panel(
        &self,
        series: &BTreeMap<Symbol, BetaSeries>,
    ) -> Result<RankedPanel, ModelError> {
        let dates: BTreeSet<Date> = series.values().flat_map(|s| s.dates()).collect();

        let results: Vec<(Date, Result<GroupAssignment, ModelError>)> = dates
            .into_par_iter()
            .map(|date| (date, self.rank(date, &cross_section(series, date))))
            .collect();

        let mut panel = RankedPanel::default();
        for (date, result) in results {
            match result {
                Ok(assignment) => {
                    debug!(%date, ranked = assignment.len(), "ranked cross-section");
                    panel.assignments.push(assignment);
                }
                Err(ModelError::InsufficientData { actual, .. }) => {
                    // Warm-up dates before any window fills carry no betas at all.
                    if actual == 0 {
                        debug!(%date, "no defined values");
                    } else {
                        warn!(%date, valid = actual, required = self.n_groups, "skipping date");
                    }
                    panel.skipped.push((date, actual));
                }
                Err(e) => return Err(e),
            }
        }
        panel.assignments.sort_by_key(GroupAssignment::date);
        panel.skipped.sort_by_key(|&(date, _)| date);

        Ok(panel)
    }
}
