//! Yahoo Finance returns provider.

use std::time::Duration;

use bab_primitives::{Date, Symbol, TimeSeries};
use bab_traits::{AcquiredUniverse, AcquisitionRequest, ProviderError, ReturnsProvider};
use chrono::{DateTime, Months};
use time::OffsetDateTime;
use tracing::{debug, info, warn};
use yahoo_finance_api as yahoo;

/// S&P 500 index.
pub const DEFAULT_BENCHMARK: &str = "^GSPC";

/// Fetches daily adjusted closes and turns them into month-end simple returns.
///
/// Symbols are fetched one at a time with a pause between requests. A symbol
/// that fails or returns no quotes is recorded in
/// [`AcquiredUniverse::failed`]; a failing benchmark aborts the fetch.
pub struct YahooReturnsProvider {
    connector: yahoo::YahooConnector,
    delay: Duration,
}

impl std::fmt::Debug for YahooReturnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooReturnsProvider").field("delay", &self.delay).finish_non_exhaustive()
    }
}

impl YahooReturnsProvider {
    /// Create a provider with a 250 ms pause between requests.
    ///
    /// # Errors
    /// Returns [`ProviderError::Connection`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ProviderError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| ProviderError::Connection(e.to_string()))?;
        Ok(Self { connector, delay: Duration::from_millis(250) })
    }

    /// Set the pause between requests.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn monthly_returns(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
    ) -> Result<TimeSeries, String> {
        // One extra month so the first in-range month has a prior close.
        let from = start.checked_sub_months(Months::new(1)).unwrap_or(start);
        let response = self
            .connector
            .get_quote_history(symbol, to_offset(from)?, to_offset(end)?)
            .await
            .map_err(|e| e.to_string())?;
        let quotes = response.quotes().map_err(|e| e.to_string())?;
        if quotes.is_empty() {
            return Err("no quotes returned".to_string());
        }

        let returns = closes_to_monthly_returns(quotes.iter().map(|q| (q.timestamp, q.adjclose)))
            .between(start, end);
        debug!(symbol, quotes = quotes.len(), months = returns.len(), "fetched quotes");
        Ok(returns)
    }
}

impl ReturnsProvider for YahooReturnsProvider {
    async fn fetch(&self, request: &AcquisitionRequest) -> Result<AcquiredUniverse, ProviderError> {
        request.validate()?;

        let benchmark = self
            .monthly_returns(request.benchmark.as_str(), request.start, request.end)
            .await
            .map_err(|reason| ProviderError::Benchmark {
                symbol: request.benchmark.clone(),
                reason,
            })?;

        let mut universe = AcquiredUniverse { benchmark, ..AcquiredUniverse::default() };
        for symbol in &request.symbols {
            tokio::time::sleep(self.delay).await;
            match self.monthly_returns(symbol.as_str(), request.start, request.end).await {
                Ok(returns) if returns.count_defined() > 0 => {
                    universe.returns.insert(symbol.clone(), returns);
                    universe.resolved.push(symbol.clone());
                }
                Ok(_) => {
                    warn!(%symbol, "no returns in range");
                    universe.failed.push((symbol.clone(), "no returns in range".to_string()));
                }
                Err(reason) => {
                    warn!(%symbol, %reason, "fetch failed");
                    universe.failed.push((symbol.clone(), reason));
                }
            }
        }

        info!(
            requested = request.symbols.len(),
            resolved = universe.resolved.len(),
            failed = universe.failed.len(),
            "acquired universe"
        );
        universe.ensure_nonempty()
    }
}

/// Month-end simple returns from `(unix seconds, adjusted close)` pairs.
///
/// Later quotes on the same day win; non-positive closes are ignored.
fn closes_to_monthly_returns(quotes: impl IntoIterator<Item = (i64, f64)>) -> TimeSeries {
    quotes
        .into_iter()
        .filter(|&(_, close)| close > 0.0)
        .filter_map(|(ts, close)| {
            Some((DateTime::from_timestamp(ts, 0)?.date_naive(), Some(close)))
        })
        .collect::<TimeSeries>()
        .resample_month_end()
        .pct_change()
}

fn to_offset(date: Date) -> Result<OffsetDateTime, String> {
    let seconds = date.and_hms_opt(0, 0, 0).ok_or("invalid date")?.and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn ts(y: i32, m: u32, d: u32) -> i64 {
        Date::from_ymd_opt(y, m, d).unwrap().and_hms_opt(14, 30, 0).unwrap().and_utc().timestamp()
    }

    #[test]
    fn month_end_returns_from_daily_closes() {
        let quotes = [
            (ts(2024, 1, 30), 99.0),
            (ts(2024, 1, 31), 100.0),
            (ts(2024, 2, 15), 104.0),
            (ts(2024, 2, 29), 110.0),
            (ts(2024, 3, 28), 99.0),
        ];
        let returns = closes_to_monthly_returns(quotes);

        let jan = Date::from_ymd_opt(2024, 1, 31).unwrap();
        let feb = Date::from_ymd_opt(2024, 2, 29).unwrap();
        let mar = Date::from_ymd_opt(2024, 3, 31).unwrap();
        assert_eq!(returns.len(), 2);
        assert!(!returns.contains_date(jan));
        assert_relative_eq!(returns.get(feb).unwrap(), 0.10, epsilon = 1e-12);
        assert_relative_eq!(returns.get(mar).unwrap(), -0.10, epsilon = 1e-12);
    }

    #[test]
    fn bad_closes_are_ignored() {
        let quotes = [(ts(2024, 1, 31), 0.0), (ts(2024, 2, 29), 50.0), (ts(2024, 3, 29), 55.0)];
        let returns = closes_to_monthly_returns(quotes);
        assert_eq!(returns.count_defined(), 1);
    }

    #[test]
    fn offset_conversion_is_midnight_utc() {
        let date = Date::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(to_offset(date).unwrap().unix_timestamp(), 1_577_836_800);
    }
}
