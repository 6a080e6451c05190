pub mod core;
pub mod manifest;
pub mod orchestration;
pub mod registry;
pub mod security;

pub use crate::core::{ForkConfig, ForkError, RateLimitConfig, RenameConfig, TokenBucket};
pub use manifest::{ManifestRewriter, PackageDescriptor, RenameRule};
pub use orchestration::{CargoPublishAction, PublishOrchestrator, RunReport};
pub use registry::{Auditor, CratesIoChecker, PublishStatus};
pub use security::{SafeCommandExecutor, TokenProvider};
