#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bab-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod panel;
pub use panel::{
    DATE_COLUMN, SYMBOL_COLUMN, frame_to_series, panel_to_series, series_to_frame,
    series_to_panel,
};

mod export;
pub use export::{read_csv, write_csv};

mod error;
pub use error::UtilsError;
