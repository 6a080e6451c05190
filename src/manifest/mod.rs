//! Manifest model: identity renaming, lossless rewriting, and the
//! per-run package descriptors the orchestrator consumes.

pub mod descriptor;
pub mod rename;
pub mod rewrite;

pub use descriptor::{load_order, validate_order, PackageDescriptor};
pub use rename::RenameRule;
pub use rewrite::ManifestRewriter;
