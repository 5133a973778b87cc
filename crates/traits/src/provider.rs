//! Return-series acquisition interface.

use std::{collections::BTreeMap, future::Future};

use bab_primitives::{Date, Symbol, TimeSeries};
use serde::{Deserialize, Serialize};

/// Errors raised by a returns provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Not a single requested entity could be resolved.
    #[error("no entities resolved out of {requested} requested")]
    NoEntities {
        /// Number of symbols requested.
        requested: usize,
    },

    /// The benchmark series could not be fetched.
    #[error("benchmark {symbol} unavailable: {reason}")]
    Benchmark {
        /// Benchmark symbol.
        symbol: Symbol,
        /// Provider message.
        reason: String,
    },

    /// Connection or client setup failure.
    #[error("provider connection error: {0}")]
    Connection(String),

    /// The underlying data source could not be read.
    #[error("provider source error: {0}")]
    Source(String),

    /// Invalid request.
    #[error("invalid acquisition request: {0}")]
    InvalidRequest(String),
}

/// What to acquire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionRequest {
    /// First date of the range, inclusive.
    pub start: Date,
    /// Last date of the range, inclusive.
    pub end: Date,
    /// Entities to fetch.
    pub symbols: Vec<Symbol>,
    /// Benchmark identifier.
    pub benchmark: Symbol,
}

impl AcquisitionRequest {
    /// Check that the date range is ordered and at least one symbol is requested.
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidRequest`] when the request cannot be served.
    pub fn validate(&self) -> Result<(), ProviderError> {
        if self.start >= self.end {
            return Err(ProviderError::InvalidRequest(format!(
                "start {} must precede end {}",
                self.start, self.end
            )));
        }
        if self.symbols.is_empty() {
            return Err(ProviderError::InvalidRequest("no symbols requested".to_string()));
        }
        Ok(())
    }
}

/// Materialized return series for the subset of entities a provider resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcquiredUniverse {
    /// Periodic returns per resolved entity.
    pub returns: BTreeMap<Symbol, TimeSeries>,
    /// Benchmark periodic returns.
    pub benchmark: TimeSeries,
    /// Identifiers that resolved, in request order.
    pub resolved: Vec<Symbol>,
    /// Identifiers that failed, with the provider's reason.
    pub failed: Vec<(Symbol, String)>,
}

impl AcquiredUniverse {
    /// Number of entities that were asked for.
    #[must_use]
    pub fn requested(&self) -> usize {
        self.resolved.len() + self.failed.len()
    }

    /// Fail when nothing resolved; partial failures pass through.
    ///
    /// # Errors
    /// Returns [`ProviderError::NoEntities`] if no entity has a series.
    pub fn ensure_nonempty(self) -> Result<Self, ProviderError> {
        if self.returns.is_empty() {
            return Err(ProviderError::NoEntities { requested: self.requested() });
        }
        Ok(self)
    }
}

/// Source of periodic return series.
///
/// Implementations must absorb per-entity failures: a symbol that cannot be
/// fetched is reported in [`AcquiredUniverse::failed`] rather than aborting
/// the batch.
pub trait ReturnsProvider: Send + Sync {
    /// Fetch one return series per requested entity plus the benchmark.
    fn fetch(
        &self,
        request: &AcquisitionRequest,
    ) -> impl Future<Output = Result<AcquiredUniverse, ProviderError>> + Send;
}
