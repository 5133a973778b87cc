//! Error types for utility functions.

use bab_primitives::PrimitivesError;

/// Errors that can occur during utility operations.
#[derive(Debug, thiserror::Error)]
pub enum UtilsError {
    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Series construction error.
    #[error("invalid series: {0}")]
    Primitives(#[from] PrimitivesError),

    /// Missing column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// A key column holds a null.
    #[error("null in key column {column} at row {row}")]
    NullKey {
        /// Column name.
        column: String,
        /// Row index.
        row: usize,
    },

    /// A date outside the representable range.
    #[error("date out of range: {0} days since epoch")]
    DateOutOfRange(i32),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
