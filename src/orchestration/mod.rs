//! Orchestration layer for the fork publish run
//!
//! Drives the sequential rewrite-checked publish sequence: registry status,
//! rate-limit tokens, the external cargo publish action, and the run report.

pub mod publisher;

pub use publisher::{
    CargoPublishAction, PackageOutcome, PublishAction, PublishOrchestrator, RunReport,
};
