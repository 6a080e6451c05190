//! Error handling for fork renaming and publishing
//!
//! This module provides the domain error type for the rename/publish
//! pipeline using the thiserror crate for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for rename and publish operations
#[derive(Error, Debug)]
pub enum ForkError {
    // Manifest errors
    #[error("Failed to parse manifest {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    #[error("Manifest {path} is missing required field '{field}'")]
    ManifestFieldMissing { path: PathBuf, field: String },

    // Configuration errors
    #[error("Invalid target version '{version}': {message}")]
    InvalidVersion { version: String, message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Publish order violation: '{package}' is listed before its dependency '{dependency}'")]
    OrderViolation { package: String, dependency: String },

    // Credential errors
    #[error("Registry token is not set (expected environment variable {env_var})")]
    TokenMissing { env_var: String },

    // Publishing errors
    #[error("Failed to publish '{package}': {message}")]
    PublishFailed { package: String, message: String },

    #[error("Command execution error: {message}")]
    CommandError { message: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ForkError {
    /// Check whether this error aborts the run before any registry write.
    ///
    /// Parse and configuration errors are detected up front; nothing has been
    /// published when they surface.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            Self::ManifestParse { .. }
                | Self::ManifestFieldMissing { .. }
                | Self::InvalidVersion { .. }
                | Self::Config { .. }
                | Self::OrderViolation { .. }
                | Self::TokenMissing { .. }
        )
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestParse { .. } => "MANIFEST_PARSE",
            Self::ManifestFieldMissing { .. } => "MANIFEST_FIELD_MISSING",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::Config { .. } => "CONFIG",
            Self::OrderViolation { .. } => "ORDER_VIOLATION",
            Self::TokenMissing { .. } => "TOKEN_MISSING",
            Self::PublishFailed { .. } => "PUBLISH_FAILED",
            Self::CommandError { .. } => "COMMAND_ERROR",
            Self::Io(_) => "IO",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_parse_error() {
        let error = ForkError::ManifestParse {
            path: PathBuf::from("crates/errors/Cargo.toml"),
            message: "expected table".to_string(),
        };

        assert!(error.is_preflight());
        assert_eq!(error.code(), "MANIFEST_PARSE");
        assert!(error.to_string().contains("crates/errors/Cargo.toml"));
    }

    #[test]
    fn test_field_missing_error() {
        let error = ForkError::ManifestFieldMissing {
            path: PathBuf::from("Cargo.toml"),
            field: "name".to_string(),
        };

        assert!(error.is_preflight());
        assert!(error.to_string().contains("'name'"));
    }

    #[test]
    fn test_publish_failed_is_not_preflight() {
        let error = ForkError::PublishFailed {
            package: "fork-core".to_string(),
            message: "crate version already exists".to_string(),
        };

        assert!(!error.is_preflight());
        assert_eq!(error.code(), "PUBLISH_FAILED");
        assert!(error.to_string().contains("already exists"));
    }

    #[test]
    fn test_token_missing_error() {
        let error = ForkError::TokenMissing {
            env_var: "CARGO_REGISTRY_TOKEN".to_string(),
        };

        assert!(error.is_preflight());
        assert!(error.to_string().contains("CARGO_REGISTRY_TOKEN"));
    }

    #[test]
    fn test_order_violation_error() {
        let error = ForkError::OrderViolation {
            package: "core_engine".to_string(),
            dependency: "core_errors".to_string(),
        };

        assert_eq!(error.code(), "ORDER_VIOLATION");
        let display = error.to_string();
        assert!(display.contains("core_engine"));
        assert!(display.contains("core_errors"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let error: ForkError = io.into();

        assert_eq!(error.code(), "IO");
        assert!(!error.is_preflight());
    }
}
