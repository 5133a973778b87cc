//! Error types for primitive construction.

use crate::{Date, Symbol};

/// Errors raised when building primitive values from untrusted input.
#[derive(Debug, thiserror::Error)]
pub enum PrimitivesError {
    /// The same date appeared twice in a series.
    #[error("duplicate date in series: {0}")]
    DuplicateDate(Date),

    /// A symbol was placed in more than one group.
    #[error("symbol {0} assigned to more than one group")]
    OverlappingGroups(Symbol),

    /// A group assignment was built with zero groups.
    #[error("group assignment must contain at least one group")]
    NoGroups,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let date = Date::from_ymd_opt(2024, 1, 31).unwrap();
        let err = PrimitivesError::DuplicateDate(date);
        assert!(err.to_string().contains("2024-01-31"));

        let err = PrimitivesError::OverlappingGroups(Symbol::new("AAPL"));
        assert!(err.to_string().contains("AAPL"));
    }
}
