//! Quantile breakpoints and binning.

use crate::MathError;

/// Quantile of already sorted data by linear interpolation between order
/// statistics (`h = (n - 1) * p`).
///
/// # Errors
/// Returns an error if `sorted` is empty or `p` is outside `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Result<f64, MathError> {
    if sorted.is_empty() {
        return Err(MathError::EmptyData);
    }
    if !(0.0..=1.0).contains(&p) {
        return Err(MathError::InvalidProbability(p));
    }

    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let frac = h - lo as f64;

    match sorted.get(lo + 1) {
        Some(&next) if frac > 0.0 => Ok(sorted[lo] + frac * (next - sorted[lo])),
        _ => Ok(sorted[lo]),
    }
}

/// `n_groups + 1` breakpoints at probabilities `0, 1/n, ..., 1`.
///
/// The first breakpoint is the minimum and the last the maximum of `values`.
///
/// # Errors
/// Returns an error if `values` is empty or `n_groups` is zero.
pub fn quantile_breakpoints(values: &[f64], n_groups: usize) -> Result<Vec<f64>, MathError> {
    if values.is_empty() {
        return Err(MathError::EmptyData);
    }
    if n_groups == 0 {
        return Err(MathError::InsufficientData { required: 1, actual: 0 });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    (0..=n_groups).map(|i| quantile_sorted(&sorted, i as f64 / n_groups as f64)).collect()
}

/// 0-based bin of `value` for right-closed bins over `breaks`.
///
/// Bin 0 is `[b0, b1]` and bin `k` is `(b_k, b_{k+1}]`, so a value sitting
/// exactly on an interior breakpoint lands in the lower bin. Values outside
/// the breakpoint range clamp to the first or last bin.
#[must_use]
pub fn bin_index(value: f64, breaks: &[f64]) -> usize {
    if breaks.len() < 3 {
        return 0;
    }
    breaks[1..breaks.len() - 1].partition_point(|&b| b < value)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(0.25, 1.75)]
    #[case(0.5, 2.5)]
    #[case(1.0, 4.0)]
    fn linear_interpolation(#[case] p: f64, #[case] expected: f64) {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(quantile_sorted(&sorted, p).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn quantile_rejects_bad_input() {
        assert!(matches!(quantile_sorted(&[], 0.5), Err(MathError::EmptyData)));
        assert!(matches!(quantile_sorted(&[1.0], 1.5), Err(MathError::InvalidProbability(_))));
    }

    #[test]
    fn breakpoints_span_min_to_max() {
        let values = [5.0, 1.0, 3.0, 2.0, 4.0];
        let breaks = quantile_breakpoints(&values, 5).unwrap();
        assert_eq!(breaks.len(), 6);
        assert_eq!(breaks[0], 1.0);
        assert_eq!(breaks[5], 5.0);
        assert!(breaks.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn bins_are_right_closed() {
        let breaks = [0.0, 1.0, 2.0, 3.0];
        assert_eq!(bin_index(0.0, &breaks), 0);
        assert_eq!(bin_index(1.0, &breaks), 0);
        assert_eq!(bin_index(1.5, &breaks), 1);
        assert_eq!(bin_index(2.0, &breaks), 1);
        assert_eq!(bin_index(3.0, &breaks), 2);
        assert_eq!(bin_index(9.0, &breaks), 2);
    }

    #[test]
    fn distinct_values_one_per_quintile() {
        let values = [0.2, 0.8, 1.1, 1.5, 2.3];
        let breaks = quantile_breakpoints(&values, 5).unwrap();
        let bins: Vec<usize> = values.iter().map(|&v| bin_index(v, &breaks)).collect();
        assert_eq!(bins, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn ties_collapse_into_lower_bin() {
        let values = [1.0, 1.0, 1.0, 1.0, 2.0];
        let breaks = quantile_breakpoints(&values, 5).unwrap();
        let bins: Vec<usize> = values.iter().map(|&v| bin_index(v, &breaks)).collect();
        assert_eq!(bins, vec![0, 0, 0, 0, 4]);
    }
}
