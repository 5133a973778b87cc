//! Error types for the strategy pipeline.

use bab_math::MathError;
use bab_primitives::PrimitivesError;

/// Errors that can occur while running the strategy pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Primitive construction error.
    #[error("invalid value: {0}")]
    Primitives(#[from] PrimitivesError),

    /// Too few observations for a local computation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// A series that must carry data has none.
    #[error("no data: {0}")]
    NoData(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inputs violate an ordering or shape contract.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ModelError {
    /// Returns whether this error is local to one entity, date, or report.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::NoData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::InvalidConfig("window must be at least 2".to_string());
        assert!(err.to_string().contains("window"));
    }

    #[test]
    fn error_is_recoverable() {
        let err = ModelError::InsufficientData { required: 5, actual: 3 };
        assert!(err.is_recoverable());
        assert!(ModelError::NoData("strategy".to_string()).is_recoverable());

        let err = ModelError::InvalidConfig("leverage".to_string());
        assert!(!err.is_recoverable());
    }
}
