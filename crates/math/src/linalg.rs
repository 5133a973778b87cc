//! Linear algebra for small regression problems.

use ndarray::{Array1, Array2};

use crate::MathError;

/// Result of an ordinary least squares fit.
#[derive(Debug, Clone)]
pub struct OlsResult {
    /// Estimated coefficients, one per design column.
    pub coefficients: Array1<f64>,
    /// Residuals `y - X b`.
    pub residuals: Array1<f64>,
    /// R-squared.
    pub r_squared: f64,
    /// `(X'X)^-1`, the bread of sandwich covariance estimators.
    pub xtx_inv: Array2<f64>,
}

/// Ordinary least squares regression of `y` on the columns of `x`.
///
/// Include a column of ones in `x` to fit an intercept.
///
/// # Errors
/// Returns error if dimensions mismatch, there are no more observations than
/// columns, or `X'X` is singular.
pub fn ordinary_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsResult, MathError> {
    let n = y.len();
    let p = x.ncols();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if n <= p {
        return Err(MathError::InsufficientData { required: p + 1, actual: n });
    }

    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let xtx_inv = invert(&xtx)?;
    let coefficients = xtx_inv.dot(&xty);

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(OlsResult { coefficients, residuals, r_squared, xtx_inv })
}

/// Invert a square matrix column by column.
///
/// # Errors
/// Returns error if the matrix is not square or is singular.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    let mut inv = Array2::zeros((n, n));
    for j in 0..n {
        let mut e = Array1::zeros(n);
        e[j] = 1.0;
        let col = solve_linear_system(a, &e)?;
        inv.column_mut(j).assign(&col);
    }
    Ok(inv)
}

/// Solve a linear system Ax = b using Gaussian elimination with partial pivoting.
fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }

    // Augmented matrix [A | b]
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val < 1e-14 {
            return Err(MathError::LinearAlgebra(
                "matrix is singular or nearly singular".to_string(),
            ));
        }

        if max_row != col {
            for j in 0..=n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / aug[[col, col]];
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    // Back substitution
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = aug[[i, n]];
        for j in (i + 1)..n {
            sum -= aug[[i, j]] * x[j];
        }
        x[i] = sum / aug[[i, i]];
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    fn with_intercept(x: &[f64]) -> Array2<f64> {
        Array2::from_shape_fn((x.len(), 2), |(i, j)| if j == 0 { 1.0 } else { x[i] })
    }

    #[test]
    fn ols_perfect_fit() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let x = with_intercept(&[1.0, 2.0, 3.0, 4.0, 5.0]);

        let result = ordinary_least_squares(&y, &x).unwrap();

        assert_relative_eq!(result.coefficients[0], 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.coefficients[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.r_squared, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn ols_noisy_fit_residuals_sum_to_zero() {
        let y = array![1.1, 1.9, 3.2, 3.8, 5.1, 5.9];
        let x = with_intercept(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        let result = ordinary_least_squares(&y, &x).unwrap();

        assert_relative_eq!(result.residuals.sum(), 0.0, epsilon = 1e-10);
        assert!(result.r_squared > 0.98 && result.r_squared < 1.0);
    }

    #[test]
    fn ols_constant_regressor_is_singular() {
        let y = array![1.0, 2.0, 3.0];
        let x = with_intercept(&[0.5, 0.5, 0.5]);
        assert!(matches!(ordinary_least_squares(&y, &x), Err(MathError::LinearAlgebra(_))));
    }

    #[test]
    fn ols_needs_more_rows_than_columns() {
        let y = array![1.0, 2.0];
        let x = with_intercept(&[1.0, 2.0]);
        assert!(matches!(
            ordinary_least_squares(&y, &x),
            Err(MathError::InsufficientData { required: 3, actual: 2 })
        ));
    }

    #[test]
    fn invert_round_trips_identity() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&a).unwrap();
        let identity = a.dot(&inv);
        assert_relative_eq!(identity[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(identity[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(identity[[1, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(identity[[1, 1]], 1.0, epsilon = 1e-12);
    }
}
