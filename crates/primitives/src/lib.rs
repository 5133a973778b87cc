#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bab-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod asset;
pub use asset::Symbol;

mod series;
pub use series::{BetaSeries, ReturnSeries, TimeSeries, align};

mod groups;
pub use groups::GroupAssignment;

mod report;
pub use report::{PerformanceReport, RegressionSummary, RunSummary};

mod error;
pub use error::PrimitivesError;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
