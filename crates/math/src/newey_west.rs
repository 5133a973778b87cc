//! OLS with Newey-West HAC (heteroskedasticity and autocorrelation consistent)
//! standard errors.
//!
//! The coefficient covariance is the sandwich
//! ```text
//! V = (X'X)^-1 S (X'X)^-1
//! S = Σ_t e_t² x_t x_t' + Σ_{l=1}^{L} w_l Σ_{t>l} e_t e_{t-l} (x_t x_{t-l}' + x_{t-l} x_t')
//! w_l = 1 - l/(L+1)   (Bartlett kernel)
//! ```
//!
//! # References
//! - Newey, W. K., & West, K. D. (1987). "A Simple, Positive Semi-Definite,
//!   Heteroskedasticity and Autocorrelation Consistent Covariance Matrix."
//!   Econometrica, 55(3), 703-708.

use ndarray::{Array1, Array2, ArrayView1};

use crate::{MathError, OlsResult, ordinary_least_squares};

/// Newey-West estimator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HacConfig {
    /// Fixed lag truncation; `None` selects `floor(4 (T/100)^(2/9))`.
    pub lags: Option<usize>,
    /// Scale the covariance by `T / (T - k)`.
    pub small_sample_adjust: bool,
}

impl Default for HacConfig {
    fn default() -> Self {
        Self { lags: None, small_sample_adjust: true }
    }
}

/// OLS fit together with its HAC covariance.
#[derive(Debug, Clone)]
pub struct HacResult {
    /// Underlying OLS fit.
    pub ols: OlsResult,
    /// HAC covariance of the coefficients.
    pub covariance: Array2<f64>,
    /// Square roots of the covariance diagonal.
    pub std_errors: Array1<f64>,
    /// Lag truncation used.
    pub lags: usize,
}

/// Rule-of-thumb lag truncation `floor(4 (T/100)^(2/9))`, at least 1 and
/// below `n_obs`.
#[must_use]
pub fn newey_west_lags(n_obs: usize) -> usize {
    let t = n_obs as f64;
    let lags = (4.0 * (t / 100.0).powf(2.0 / 9.0)).floor() as usize;
    lags.max(1).min(n_obs.saturating_sub(1))
}

/// Bartlett kernel weight for `lag` under truncation `max_lag`.
#[must_use]
pub fn bartlett_weight(lag: usize, max_lag: usize) -> f64 {
    if lag == 0 {
        1.0
    } else if lag <= max_lag {
        1.0 - (lag as f64) / (max_lag as f64 + 1.0)
    } else {
        0.0
    }
}

/// Fit `y` on `x` by OLS and compute Newey-West standard errors.
///
/// # Errors
/// Returns error if the OLS fit fails (dimension mismatch, too few
/// observations, singular design).
pub fn newey_west_ols(
    y: &Array1<f64>,
    x: &Array2<f64>,
    config: HacConfig,
) -> Result<HacResult, MathError> {
    let ols = ordinary_least_squares(y, x)?;
    let (n, k) = x.dim();
    let lags = config.lags.unwrap_or_else(|| newey_west_lags(n)).min(n.saturating_sub(1));

    // Score contributions g_t = x_t * e_t
    let scores: Vec<Array1<f64>> =
        (0..n).map(|t| x.row(t).to_owned() * ols.residuals[t]).collect();

    let mut meat = Array2::<f64>::zeros((k, k));
    for g in &scores {
        add_outer(&mut meat, g.view(), g.view(), 1.0);
    }
    for lag in 1..=lags {
        let w = bartlett_weight(lag, lags);
        for t in lag..n {
            add_outer(&mut meat, scores[t].view(), scores[t - lag].view(), w);
            add_outer(&mut meat, scores[t - lag].view(), scores[t].view(), w);
        }
    }

    let mut covariance = ols.xtx_inv.dot(&meat).dot(&ols.xtx_inv);
    if config.small_sample_adjust {
        covariance *= n as f64 / (n - k) as f64;
    }

    let std_errors = covariance.diag().mapv(|v| v.max(0.0).sqrt());

    Ok(HacResult { ols, covariance, std_errors, lags })
}

fn add_outer(acc: &mut Array2<f64>, a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>, w: f64) {
    for i in 0..a.len() {
        for j in 0..b.len() {
            acc[[i, j]] += w * a[i] * b[j];
        }
    }
}
