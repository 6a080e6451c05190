//! Registry status checking against the crates.io read API
//!
//! Answers "is package P at version V already on the registry" without any
//! write. A 404 is a definite no; an exact version match on a 200 is a
//! definite yes; everything else (network failure, non-404 error status,
//! malformed body) is `Unknown`, which the orchestrator treats as "attempt
//! the publish" so a flaky check can never silently skip a package.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Default registry read endpoint
pub const CRATES_IO_API: &str = "https://crates.io/api/v1";

/// crates.io policy requires an identifying User-Agent on API requests
const USER_AGENT: &str = concat!("fork-publisher/", env!("CARGO_PKG_VERSION"));

/// Outcome of a status query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStatus {
    /// The exact name/version pair exists on the registry
    Published,
    /// The registry definitively does not have this version
    NotPublished,
    /// The check could not be completed; treat as "must attempt publish"
    Unknown,
}

/// Read-only status query, mockable in orchestrator tests
#[async_trait]
pub trait StatusCheck: Send + Sync {
    async fn is_published(&self, name: &str, version: &str) -> PublishStatus;
}

/// `GET /crates/{name}/{version}` response shape (the fields we compare)
#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: VersionInfo,
}

#[derive(Debug, Deserialize)]
struct VersionInfo {
    num: String,
}

/// Status checker backed by the crates.io HTTP API
pub struct CratesIoChecker {
    client: reqwest::Client,
    base_url: String,
}

impl CratesIoChecker {
    pub fn new() -> Self {
        Self::with_base_url(CRATES_IO_API)
    }

    /// Point the checker at a different endpoint (tests, mirrors)
    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// List published versions of a crate, newest first as the registry
    /// reports them. `Ok(None)` means the crate does not exist yet.
    pub async fn published_versions(&self, name: &str) -> anyhow::Result<Option<Vec<String>>> {
        let url = format!("{}/crates/{}", self.base_url, name);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("registry returned HTTP {} for {}", response.status(), name);
        }

        #[derive(Deserialize)]
        struct CrateResponse {
            #[serde(default)]
            versions: Vec<VersionInfo>,
        }

        let info = response.json::<CrateResponse>().await?;
        Ok(Some(info.versions.into_iter().map(|v| v.num).collect()))
    }
}

impl Default for CratesIoChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StatusCheck for CratesIoChecker {
    async fn is_published(&self, name: &str, version: &str) -> PublishStatus {
        let url = format!("{}/crates/{}/{}", self.base_url, name, version);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                eprintln!("⚠️  Status check failed for {} v{}: {}", name, version, e);
                return PublishStatus::Unknown;
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return PublishStatus::NotPublished;
        }
        if !status.is_success() {
            eprintln!(
                "⚠️  Status check failed for {} v{}: HTTP {}",
                name, version, status
            );
            return PublishStatus::Unknown;
        }

        match response.json::<VersionResponse>().await {
            Ok(body) => classify_version_match(&body.version.num, version),
            Err(e) => {
                eprintln!(
                    "⚠️  Malformed registry response for {} v{}: {}",
                    name, version, e
                );
                PublishStatus::Unknown
            }
        }
    }
}

/// Compare the version the registry returned against the one requested.
///
/// Exact string equality only; a 200 for a different version string means
/// the requested version is not published.
fn classify_version_match(returned: &str, requested: &str) -> PublishStatus {
    if returned == requested {
        PublishStatus::Published
    } else {
        PublishStatus::NotPublished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_version_match_is_published() {
        assert_eq!(
            classify_version_match("0.2.0", "0.2.0"),
            PublishStatus::Published
        );
    }

    #[test]
    fn test_version_mismatch_is_not_published() {
        assert_eq!(
            classify_version_match("0.1.0", "0.2.0"),
            PublishStatus::NotPublished
        );
    }

    #[test]
    fn test_version_comparison_is_exact_string_equality() {
        // Semver-equal but textually different must not count as published
        assert_eq!(
            classify_version_match("0.2.0+build1", "0.2.0"),
            PublishStatus::NotPublished
        );
    }

    #[test]
    fn test_version_response_shape() {
        let body = r#"{"version": {"num": "0.16.2", "crate": "jxoesneon-tectonic"}}"#;
        let parsed: VersionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.version.num, "0.16.2");
    }

    #[test]
    fn test_malformed_body_does_not_parse() {
        let body = r#"{"errors": [{"detail": "Not Found"}]}"#;
        assert!(serde_json::from_str::<VersionResponse>(body).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_registry_maps_to_unknown() {
        // Port 1 on localhost refuses connections immediately
        let checker = CratesIoChecker::with_base_url("http://127.0.0.1:1");
        let status = checker.is_published("prefix-core", "0.2.0").await;
        assert_eq!(status, PublishStatus::Unknown);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let checker = CratesIoChecker::with_base_url("https://crates.io/api/v1/");
        assert_eq!(checker.base_url, "https://crates.io/api/v1");
    }
}
