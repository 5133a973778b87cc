#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/bab-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod provider;
pub use provider::{AcquiredUniverse, AcquisitionRequest, ProviderError, ReturnsProvider};

mod store;
pub use store::{MemoryStore, SnapshotStore, StoreError, load_snapshot, save_snapshot};

mod report;
pub use report::{ReportContext, ReportError, ReportSink};
