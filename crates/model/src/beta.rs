//! Rolling beta estimation.

use std::collections::BTreeMap;

use bab_math::rolling_slope;
use bab_primitives::{BetaSeries, Symbol, TimeSeries, align};
use rayon::prelude::*;
use tracing::debug;

/// Windowed OLS slope of an entity's returns on a benchmark's returns.
///
/// The output is indexed by every date the two series share. Dates before
/// the first full window are undefined, as is any window where either side
/// has fewer than `ceil(window / 2)` defined returns or the benchmark is
/// constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingBetaEstimator {
    window: usize,
}

impl RollingBetaEstimator {
    /// Create an estimator over `window` aligned observations.
    #[must_use]
    pub const fn new(window: usize) -> Self {
        Self { window }
    }

    /// Window length.
    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    /// Minimum defined observations per side within a window.
    #[must_use]
    pub const fn min_valid(&self) -> usize {
        self.window.div_ceil(2)
    }

    /// Estimate the beta series of one entity.
    #[must_use]
    pub fn estimate(&self, entity: &TimeSeries, benchmark: &TimeSeries) -> BetaSeries {
        let aligned = align(entity, benchmark);
        let ys: Vec<Option<f64>> = aligned.iter().map(|&(_, y, _)| y).collect();
        let xs: Vec<Option<f64>> = aligned.iter().map(|&(_, _, x)| x).collect();

        let betas = rolling_slope(&ys, &xs, self.window, self.min_valid());
        aligned.iter().zip(betas).map(|(&(date, _, _), beta)| (date, beta)).collect()
    }

    /// Estimate beta series for every entity in parallel.
    #[must_use]
    pub fn estimate_all(
        &self,
        entities: &BTreeMap<Symbol, TimeSeries>,
        benchmark: &TimeSeries,
    ) -> BTreeMap<Symbol, BetaSeries> {
        entities
            .par_iter()
            .map(|(symbol, returns)| {
                let betas = self.estimate(returns, benchmark);
                if betas.count_defined() == 0 {
                    debug!(%symbol, aligned = betas.len(), "no defined beta");
                }
                (symbol.clone(), betas)
            })
            .collect()
    }
}
