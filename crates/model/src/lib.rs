#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bab-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::{RebalanceFrequency, StrategyConfig};

mod beta;
pub use beta::RollingBetaEstimator;

mod ranker;
pub use ranker::{CrossSectionalRanker, RankedPanel, cross_section};

mod aggregate;
pub use aggregate::{AggregatedReturns, PeriodDiagnostics, PortfolioReturnAggregator};

mod evaluate;
pub use evaluate::{EvaluatorConfig, FactorRegressionEvaluator};

mod pipeline;
pub use pipeline::{BabPipeline, PipelineOutput};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use bab_primitives::{GroupAssignment, PerformanceReport, RunSummary, Symbol, TimeSeries};

    pub use super::{BabPipeline, ModelError, PipelineOutput, StrategyConfig};
}
