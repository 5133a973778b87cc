#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bab-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod quantile;
pub use quantile::{bin_index, quantile_breakpoints, quantile_sorted};

mod rolling;
pub use rolling::{DEGENERATE_VARIANCE, ols_slope, rolling_slope};

mod linalg;
pub use linalg::{OlsResult, invert, ordinary_least_squares};

mod newey_west;
pub use newey_west::{HacConfig, HacResult, bartlett_weight, newey_west_lags, newey_west_ols};

mod stats;
pub use stats::{max_drawdown, mean, sample_std, two_sided_p_value};

mod error;
pub use error::MathError;
