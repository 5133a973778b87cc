//! Return-series statistics.

use statrs::{
    distribution::{ContinuousCDF, StudentsT},
    statistics::Statistics,
};

/// Arithmetic mean; `None` for empty input.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().mean())
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let std = values.iter().std_dev();
    std.is_finite().then_some(std)
}

/// Largest peak-to-trough decline of the wealth curve built from `returns`.
///
/// The curve starts at 1.0, so a loss in the first period counts as a
/// drawdown. Returns 0.0 when the curve never declines.
#[must_use]
pub fn max_drawdown(returns: &[f64]) -> f64 {
    let mut wealth = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut worst = 0.0_f64;

    for r in returns {
        wealth *= 1.0 + r;
        peak = peak.max(wealth);
        if peak > 0.0 {
            worst = worst.max((peak - wealth) / peak);
        }
    }

    worst
}

/// Two-sided p-value of `t_stat` under Student's t with `dof` degrees of freedom.
#[must_use]
pub fn two_sided_p_value(t_stat: f64, dof: f64) -> Option<f64> {
    if !t_stat.is_finite() || dof <= 0.0 {
        return None;
    }
    let dist = StudentsT::new(0.0, 1.0, dof).ok()?;
    Some((2.0 * (1.0 - dist.cdf(t_stat.abs()))).clamp(0.0, 1.0))
}
