//! Report rendering interface.

use bab_primitives::{PerformanceReport, RunSummary, TimeSeries};

/// Errors raised while rendering a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Output could not be written.
    #[error("report io error: {0}")]
    Io(#[from] std::io::Error),

    /// Renderer-specific failure.
    #[error("report rendering failed: {0}")]
    Render(String),
}

/// Everything a renderer may display for one run.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Performance statistics, absent when the strategy produced no returns.
    pub report: Option<&'a PerformanceReport>,
    /// Strategy return series, undefined periods included.
    pub strategy: &'a TimeSeries,
    /// Strategy wealth curve.
    pub strategy_wealth: &'a TimeSeries,
    /// Benchmark wealth curve over the same window.
    pub benchmark_wealth: &'a TimeSeries,
    /// Processing counts for the run.
    pub summary: &'a RunSummary,
}

/// Renders a finished run.
///
/// The pipeline never depends on rendering succeeding; callers log and
/// discard a returned error.
pub trait ReportSink: Send + Sync {
    /// Render the run.
    ///
    /// # Errors
    /// Returns [`ReportError`] if output cannot be produced.
    fn render(&self, context: &ReportContext<'_>) -> Result<(), ReportError>;
}
