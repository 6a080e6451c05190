//! Configuration for the fork rename/publish pipeline
//!
//! Loaded from `.fork-publisher.yml` in the workspace root. Every rate-limit
//! constant is explicit configuration rather than a module constant so it can
//! be tuned per registry and overridden in tests. Defaults encode the
//! documented crates.io limits: a burst of 30 publishes refilling at one per
//! minute (61 s for safety), and one read-API request per second.

use crate::core::error::ForkError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration file name
pub const CONFIG_FILE: &str = ".fork-publisher.yml";

/// Root configuration object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForkConfig {
    /// Rename rule applied to every package identity
    pub rename: RenameConfig,

    /// Crate directories in topological publish order (dependencies first).
    /// The order is supplied, not computed; `"."` names the workspace root
    /// crate.
    pub crates: Vec<PathBuf>,

    /// Registry rate limits
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Published-name rule parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenameConfig {
    /// Prefix prepended to every published name (e.g. "jxoesneon-")
    pub prefix: String,

    /// Distinguished root package name (e.g. "tectonic"); packages named
    /// `<root>_foo` publish as `<prefix><root>-foo`
    pub root_name: String,
}

/// Registry rate-limit tuning
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RateLimitConfig {
    /// Publish burst capacity (tokens)
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// Seconds to refill one publish token
    #[serde(default = "default_refill_secs")]
    pub refill_secs: u64,

    /// Minimum spacing between read-API requests, in seconds
    #[serde(default = "default_api_spacing_secs")]
    pub api_spacing_secs: f64,

    /// Extra sleep added to every reported token wait, in seconds
    #[serde(default = "default_safety_margin_secs")]
    pub safety_margin_secs: u64,

    /// Pause after each successful publish, in seconds
    #[serde(default = "default_publish_pause_secs")]
    pub publish_pause_secs: u64,
}

fn default_burst() -> u32 {
    30
}

fn default_refill_secs() -> u64 {
    61
}

fn default_api_spacing_secs() -> f64 {
    1.0
}

fn default_safety_margin_secs() -> u64 {
    1
}

fn default_publish_pause_secs() -> u64 {
    1
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: default_burst(),
            refill_secs: default_refill_secs(),
            api_spacing_secs: default_api_spacing_secs(),
            safety_margin_secs: default_safety_margin_secs(),
            publish_pause_secs: default_publish_pause_secs(),
        }
    }
}

impl RateLimitConfig {
    pub fn refill_period(&self) -> Duration {
        Duration::from_secs(self.refill_secs)
    }

    pub fn api_spacing(&self) -> Duration {
        Duration::from_secs_f64(self.api_spacing_secs)
    }

    pub fn safety_margin(&self) -> Duration {
        Duration::from_secs(self.safety_margin_secs)
    }

    pub fn publish_pause(&self) -> Duration {
        Duration::from_secs(self.publish_pause_secs)
    }
}

impl ForkConfig {
    /// Load configuration from `<workspace_root>/.fork-publisher.yml`
    pub fn load<P: AsRef<Path>>(workspace_root: P) -> Result<Self, ForkError> {
        let path = workspace_root.as_ref().join(CONFIG_FILE);
        let content = std::fs::read_to_string(&path).map_err(|e| ForkError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ForkError> {
        let config: ForkConfig =
            serde_yaml::from_str(content).map_err(|e| ForkError::Config {
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ForkError> {
        if self.rename.prefix.is_empty() {
            return Err(ForkError::Config {
                message: "rename.prefix must not be empty".to_string(),
            });
        }
        if self.rename.root_name.is_empty() {
            return Err(ForkError::Config {
                message: "rename.root_name must not be empty".to_string(),
            });
        }
        if self.crates.is_empty() {
            return Err(ForkError::Config {
                message: "crates list must not be empty".to_string(),
            });
        }
        if self.rate_limit.burst == 0 {
            return Err(ForkError::Config {
                message: "rate_limit.burst must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
