//! Date-indexed numeric series.
//!
//! A [`TimeSeries`] maps strictly increasing dates to an optional value. `None`
//! is the undefined sentinel: it survives alignment so date domains stay
//! intact, but it never enters arithmetic.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, btree_map::Entry},
};

use chrono::{Datelike, Months};
use serde::{Deserialize, Serialize};

use crate::{Date, PrimitivesError};

/// Periodic returns for one entity or benchmark.
pub type ReturnSeries = TimeSeries;

/// Rolling beta estimates for one entity.
pub type BetaSeries = TimeSeries;

/// Ordered mapping from date to an optional value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: BTreeMap<Date, Option<f64>>,
}

impl TimeSeries {
    /// Create an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: BTreeMap::new() }
    }

    /// Build a series from `(date, value)` pairs.
    ///
    /// Non-finite values are stored as undefined.
    ///
    /// # Errors
    /// Returns [`PrimitivesError::DuplicateDate`] if a date occurs twice.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, PrimitivesError>
    where
        I: IntoIterator<Item = (Date, Option<f64>)>,
    {
        let mut points = BTreeMap::new();
        for (date, value) in pairs {
            match points.entry(date) {
                Entry::Occupied(_) => return Err(PrimitivesError::DuplicateDate(date)),
                Entry::Vacant(slot) => {
                    slot.insert(value.filter(|v| v.is_finite()));
                }
            }
        }
        Ok(Self { points })
    }

    /// Build a fully defined series from `(date, value)` pairs.
    ///
    /// # Errors
    /// Returns [`PrimitivesError::DuplicateDate`] if a date occurs twice.
    pub fn from_values<I>(values: I) -> Result<Self, PrimitivesError>
    where
        I: IntoIterator<Item = (Date, f64)>,
    {
        Self::from_pairs(values.into_iter().map(|(date, value)| (date, Some(value))))
    }

    /// Number of dates, defined or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Defined value at `date`, if any.
    #[must_use]
    pub fn get(&self, date: Date) -> Option<f64> {
        self.points.get(&date).copied().flatten()
    }

    /// Whether `date` is part of the series domain.
    #[must_use]
    pub fn contains_date(&self, date: Date) -> bool {
        self.points.contains_key(&date)
    }

    /// Iterate over all entries in date order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Date, Option<f64>)> + '_ {
        self.points.iter().map(|(date, value)| (*date, *value))
    }

    /// Iterate over the dates in order.
    pub fn dates(&self) -> impl DoubleEndedIterator<Item = Date> + '_ {
        self.points.keys().copied()
    }

    /// Iterate over defined entries only.
    pub fn defined(&self) -> impl Iterator<Item = (Date, f64)> + '_ {
        self.points.iter().filter_map(|(date, value)| value.map(|v| (*date, v)))
    }

    /// Defined values in date order.
    #[must_use]
    pub fn defined_values(&self) -> Vec<f64> {
        self.points.values().flatten().copied().collect()
    }

    /// Number of defined entries.
    #[must_use]
    pub fn count_defined(&self) -> usize {
        self.points.values().filter(|v| v.is_some()).count()
    }

    /// Earliest date.
    #[must_use]
    pub fn first_date(&self) -> Option<Date> {
        self.points.keys().next().copied()
    }

    /// Latest date.
    #[must_use]
    pub fn last_date(&self) -> Option<Date> {
        self.points.keys().next_back().copied()
    }

    /// Copy of the series with undefined entries removed.
    #[must_use]
    pub fn drop_undefined(&self) -> Self {
        self.defined().map(|(date, value)| (date, Some(value))).collect()
    }

    /// Entries with `start <= date <= end`.
    #[must_use]
    pub fn between(&self, start: Date, end: Date) -> Self {
        if start > end {
            return Self::new();
        }
        Self { points: self.points.range(start..=end).map(|(d, v)| (*d, *v)).collect() }
    }

    /// Apply `f` to every defined value, keeping the date domain.
    #[must_use]
    pub fn map_defined(&self, f: impl Fn(f64) -> f64) -> Self {
        self.iter().map(|(date, value)| (date, value.map(&f))).collect()
    }

    /// Subtract a constant per-period rate from every defined value.
    #[must_use]
    pub fn excess_over(&self, rate_per_period: f64) -> Self {
        self.map_defined(|r| r - rate_per_period)
    }

    /// Simple returns `p_t / p_{t-1} - 1` between consecutive entries.
    #[must_use]
    pub fn pct_change(&self) -> Self {
        self.changes(|prev, curr| curr / prev - 1.0)
    }

    /// Log returns `ln(p_t / p_{t-1})` between consecutive entries.
    #[must_use]
    pub fn log_change(&self) -> Self {
        self.changes(|prev, curr| (curr / prev).ln())
    }

    fn changes(&self, f: impl Fn(f64, f64) -> f64) -> Self {
        self.points
            .iter()
            .zip(self.points.iter().skip(1))
            .map(|((_, prev), (date, curr))| {
                let value = match (prev, curr) {
                    (Some(p), Some(c)) if *p > 0.0 => Some(f(*p, *c)),
                    _ => None,
                };
                (*date, value)
            })
            .collect()
    }

    /// Last defined observation of each calendar month, dated at month end.
    #[must_use]
    pub fn resample_month_end(&self) -> Self {
        let mut points = BTreeMap::new();
        for (date, value) in self.defined() {
            if let Some(end) = month_end(date) {
                points.insert(end, Some(value));
            }
        }
        Self { points }
    }

    /// Running product of `1 + r` over the defined entries.
    #[must_use]
    pub fn cumulative_wealth(&self) -> Self {
        let mut wealth = 1.0;
        self.defined()
            .map(|(date, r)| {
                wealth *= 1.0 + r;
                (date, Some(wealth))
            })
            .collect()
    }

    /// Observation frequency inferred from the median spacing between dates.
    ///
    /// Returns `None` for fewer than two dates.
    #[must_use]
    pub fn periods_per_year(&self) -> Option<u32> {
        let dates: Vec<Date> = self.dates().collect();
        if dates.len() < 2 {
            return None;
        }
        let mut gaps: Vec<i64> = dates.windows(2).map(|w| (w[1] - w[0]).num_days()).collect();
        gaps.sort_unstable();
        let median = gaps[gaps.len() / 2];
        Some(match median {
            ..=4 => 252,
            5..=10 => 52,
            11..=45 => 12,
            46..=120 => 4,
            _ => 1,
        })
    }
}

/// Later duplicates overwrite earlier ones; non-finite values become undefined.
impl FromIterator<(Date, Option<f64>)> for TimeSeries {
    fn from_iter<T: IntoIterator<Item = (Date, Option<f64>)>>(iter: T) -> Self {
        Self {
            points: iter
                .into_iter()
                .map(|(date, value)| (date, value.filter(|v| v.is_finite())))
                .collect(),
        }
    }
}

/// Inner join of two series on date.
///
/// Only dates present in both inputs are kept, in ascending order. Values at
/// matched dates may still be undefined.
#[must_use]
pub fn align(a: &TimeSeries, b: &TimeSeries) -> Vec<(Date, Option<f64>, Option<f64>)> {
    let mut left = a.points.iter().peekable();
    let mut right = b.points.iter().peekable();
    let mut out = Vec::with_capacity(a.len().min(b.len()));

    loop {
        let (Some(&(da, va)), Some(&(db, vb))) = (left.peek(), right.peek()) else {
            break;
        };
        match da.cmp(db) {
            Ordering::Less => {
                left.next();
            }
            Ordering::Greater => {
                right.next();
            }
            Ordering::Equal => {
                out.push((*da, *va, *vb));
                left.next();
                right.next();
            }
        }
    }

    out
}

fn month_end(date: Date) -> Option<Date> {
    date.with_day(1)?.checked_add_months(Months::new(1))?.pred_opt()
}
