//! Whitelisted external command execution
//!
//! The publish action shells out to `cargo publish`. Commands run through
//! `std::process::Command` with arguments passed as a vector, so nothing is
//! ever interpolated into a shell string, and only whitelisted binaries can
//! be invoked at all. Output is captured; the exit status and stderr are the
//! orchestrator's only feedback signal from a publish attempt.

use crate::core::error::ForkError;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Commands this tool is allowed to execute
const ALLOWED_COMMANDS: &[&str] = &["cargo"];

/// Executes whitelisted commands with captured output
#[derive(Debug)]
pub struct SafeCommandExecutor {
    working_dir: PathBuf,
}

impl SafeCommandExecutor {
    /// Create an executor rooted at `working_dir`.
    ///
    /// # Errors
    ///
    /// Fails when the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, ForkError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.exists() {
            return Err(ForkError::CommandError {
                message: format!("working directory does not exist: {}", working_dir.display()),
            });
        }

        Ok(Self { working_dir })
    }

    /// Execute a whitelisted command, capturing stdout and stderr.
    ///
    /// A non-zero exit status is not an error here; callers inspect the
    /// returned `Output` and decide.
    pub fn execute(&self, command: &str, args: &[&str]) -> Result<Output, ForkError> {
        if !ALLOWED_COMMANDS.contains(&command) {
            return Err(ForkError::CommandError {
                message: format!("command '{}' is not in the allowed whitelist", command),
            });
        }

        Command::new(command)
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|e| ForkError::CommandError {
                message: format!("failed to execute {}: {}", command, e),
            })
    }
}
