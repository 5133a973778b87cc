#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bab-rs/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use bab_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use bab_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use bab_math as math;
#[cfg(feature = "model")]
#[doc(inline)]
pub use bab_model as model;
#[cfg(feature = "utils")]
#[doc(inline)]
pub use bab_utils as utils;

#[cfg(feature = "io")]
mod store;
#[cfg(feature = "io")]
pub use store::JsonFileStore;

#[cfg(feature = "io")]
mod csv;
#[cfg(feature = "io")]
pub use csv::{CsvReturnsProvider, RETURN_COLUMN};

#[cfg(feature = "io")]
mod report;
#[cfg(feature = "io")]
pub use report::ConsoleReport;

#[cfg(feature = "yahoo")]
mod yahoo;
#[cfg(feature = "yahoo")]
pub use yahoo::{DEFAULT_BENCHMARK, YahooReturnsProvider};
