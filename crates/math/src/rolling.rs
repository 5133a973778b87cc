//! Rolling univariate OLS slopes over data with gaps.

/// Benchmark variance at or below this is treated as degenerate.
pub const DEGENERATE_VARIANCE: f64 = 1e-14;

/// OLS slope of `y` on `x` over the pairwise-defined observations.
///
/// Returns `None` when fewer than two pairs are defined or the variance of
/// `x` is degenerate.
#[must_use]
pub fn ols_slope(y: &[Option<f64>], x: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> =
        y.iter().zip(x).filter_map(|(yi, xi)| Some(((*yi)?, (*xi)?))).collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_y = pairs.iter().map(|(yi, _)| yi).sum::<f64>() / n;
    let mean_x = pairs.iter().map(|(_, xi)| xi).sum::<f64>() / n;

    let (sxy, sxx) = pairs.iter().fold((0.0, 0.0), |(sxy, sxx), (yi, xi)| {
        let dx = xi - mean_x;
        (sxy + dx * (yi - mean_y), sxx + dx * dx)
    });

    if sxx / (n - 1.0) <= DEGENERATE_VARIANCE {
        return None;
    }

    let slope = sxy / sxx;
    slope.is_finite().then_some(slope)
}

/// Slope of `y` on `x` over every window of `window` consecutive observations.
///
/// The output has one entry per input position, dated at the window's right
/// edge; the first `window - 1` entries are `None`. A window is undefined when
/// either side has fewer than `min_valid` defined values.
///
/// # Panics
/// Debug builds assert that `y` and `x` have equal length.
#[must_use]
pub fn rolling_slope(
    y: &[Option<f64>],
    x: &[Option<f64>],
    window: usize,
    min_valid: usize,
) -> Vec<Option<f64>> {
    debug_assert_eq!(y.len(), x.len());
    let n = y.len().min(x.len());
    let mut out = vec![None; n];
    if window == 0 || n < window {
        return out;
    }

    for end in window..=n {
        let start = end - window;
        let (ys, xs) = (&y[start..end], &x[start..end]);
        let y_valid = ys.iter().filter(|v| v.is_some()).count();
        let x_valid = xs.iter().filter(|v| v.is_some()).count();
        if y_valid < min_valid || x_valid < min_valid {
            continue;
        }
        out[end - 1] = ols_slope(ys, xs);
    }

    out
}
