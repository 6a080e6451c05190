//! Read-only registry queries: publish status checks and the audit report.

pub mod audit;
pub mod status;

pub use audit::{AuditRow, Auditor};
pub use status::{CratesIoChecker, PublishStatus, StatusCheck, CRATES_IO_API};
