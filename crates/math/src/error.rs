//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid probability value.
    #[error("invalid probability: {0} (must be in [0, 1])")]
    InvalidProbability(f64),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Not enough observations for the requested computation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MathError::InvalidProbability(1.5);
        assert!(err.to_string().contains("1.5"));

        let err = MathError::DimensionMismatch { expected: 10, actual: 5 };
        assert!(err.to_string().contains("10") && err.to_string().contains("5"));

        let err = MathError::InsufficientData { required: 3, actual: 2 };
        assert_eq!(err.to_string(), "insufficient data: need at least 3 observations, got 2");
    }
}
