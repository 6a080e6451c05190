//! Publish orchestrator: sequential, rate-limited, fail-fast, resumable
//!
//! Walks the supplied package order one crate at a time (registry-side
//! dependency resolution needs each crate's dependencies visible before it
//! is published). For every package: skip below the resume index, ask the
//! registry whether the version already exists, wait for a rate-limit
//! token, then run the external publish action. The first failure aborts
//! the rest of the run; nothing is rolled back because registry publication
//! is irreversible. The report names the stop index so an operator can
//! re-run with the matching resume index.

use crate::core::config::RateLimitConfig;
use crate::core::error::ForkError;
use crate::core::rate_limit::TokenBucket;
use crate::manifest::descriptor::PackageDescriptor;
use crate::registry::status::{PublishStatus, StatusCheck};
use crate::security::command_executor::SafeCommandExecutor;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use tokio::time::sleep;
use uuid::Uuid;

/// External publish action, mockable in tests
#[async_trait]
pub trait PublishAction: Send + Sync {
    async fn publish(
        &self,
        package: &PackageDescriptor,
        token: &SecretString,
    ) -> Result<(), ForkError>;
}

/// Publishes through `cargo publish`.
///
/// `--no-verify` and `--allow-dirty` mirror how the fork is released: the
/// rewrite pass leaves the working tree dirty by design, and verification
/// builds would multiply an hour-long run.
pub struct CargoPublishAction {
    workspace_root: PathBuf,
}

impl CargoPublishAction {
    pub fn new<P: Into<PathBuf>>(workspace_root: P) -> Self {
        Self {
            workspace_root: workspace_root.into(),
        }
    }
}

#[async_trait]
impl PublishAction for CargoPublishAction {
    async fn publish(
        &self,
        package: &PackageDescriptor,
        token: &SecretString,
    ) -> Result<(), ForkError> {
        let executor = SafeCommandExecutor::new(&self.workspace_root)?;
        let manifest_path = package.manifest_path();
        let manifest = manifest_path.to_string_lossy();

        let output = executor.execute(
            "cargo",
            &[
                "publish",
                "--token",
                token.expose_secret(),
                "--no-verify",
                "--allow-dirty",
                "--manifest-path",
                manifest.as_ref(),
            ],
        )?;

        if output.status.success() {
            return Ok(());
        }

        Err(ForkError::PublishFailed {
            package: package.name.clone(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Terminal state of one package within a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    /// Below the resume index; no network or publish activity at all
    Skipped,
    /// The registry already has this exact version
    AlreadyPublished,
    /// Publish action succeeded
    Published,
    /// Publish action failed; the run stopped here
    Failed(String),
}

/// Result of one orchestrator run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// One entry per package that was reached, in order
    pub outcomes: Vec<(String, PackageOutcome)>,

    /// Index of the package the run failed on, if any. Packages after it
    /// were never attempted; re-run with this value as the resume index to
    /// retry from the failure.
    pub stop_index: Option<usize>,

    pub success: bool,
}

impl RunReport {
    /// Count of packages that actually published in this run
    pub fn published_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == PackageOutcome::Published)
            .count()
    }
}

/// Drives the end-to-end publish sequence
pub struct PublishOrchestrator {
    checker: Box<dyn StatusCheck>,
    action: Box<dyn PublishAction>,
    limits: RateLimitConfig,
    bucket: TokenBucket,
}

impl PublishOrchestrator {
    pub fn new(
        checker: Box<dyn StatusCheck>,
        action: Box<dyn PublishAction>,
        limits: RateLimitConfig,
    ) -> Self {
        let bucket = TokenBucket::new(limits.burst, limits.refill_period());

        Self {
            checker,
            action,
            limits,
            bucket,
        }
    }

    /// Run the publish sequence over `order`, starting at `resume_index`.
    ///
    /// Never panics and never returns early: every ending, including a
    /// publish failure, is described by the returned report.
    pub async fn run(
        &mut self,
        order: &[PackageDescriptor],
        resume_index: usize,
        token: &SecretString,
    ) -> RunReport {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let mut outcomes = Vec::with_capacity(order.len());
        let mut stop_index = None;

        println!(
            "🚀 Publish run {} — {} packages, resuming at index {}",
            run_id,
            order.len(),
            resume_index
        );

        for (index, package) in order.iter().enumerate() {
            if index < resume_index {
                println!(
                    "⏭️  [{}/{}] {} — skipped (before resume index)",
                    index + 1,
                    order.len(),
                    package.name
                );
                outcomes.push((package.name.clone(), PackageOutcome::Skipped));
                continue;
            }

            println!(
                "🔍 [{}/{}] {} v{} — checking registry...",
                index + 1,
                order.len(),
                package.name,
                package.version
            );

            // Registry read API has its own rate limit, separate from the
            // publish limit.
            sleep(self.limits.api_spacing()).await;

            match self.checker.is_published(&package.name, &package.version).await {
                PublishStatus::Published => {
                    println!("✅ {} v{} already published, skipping", package.name, package.version);
                    outcomes.push((package.name.clone(), PackageOutcome::AlreadyPublished));
                    continue;
                }
                PublishStatus::Unknown => {
                    // Never skip on an ambiguous answer; the registry itself
                    // rejects a true duplicate publish.
                    eprintln!(
                        "⚠️  Could not determine status of {} v{}; attempting publish",
                        package.name, package.version
                    );
                }
                PublishStatus::NotPublished => {}
            }

            self.wait_for_token().await;

            println!(
                "📦 Publishing {} v{} (tokens left: {:.2})",
                package.name,
                package.version,
                self.bucket.available()
            );

            match self.action.publish(package, token).await {
                Ok(()) => {
                    println!("✅ {} v{} published", package.name, package.version);
                    outcomes.push((package.name.clone(), PackageOutcome::Published));

                    if index + 1 < order.len() {
                        sleep(self.limits.publish_pause()).await;
                    }
                }
                Err(e) => {
                    eprintln!("❌ {} failed: {}", package.name, e);
                    outcomes.push((package.name.clone(), PackageOutcome::Failed(e.to_string())));
                    stop_index = Some(index);
                    break;
                }
            }
        }

        let success = stop_index.is_none();
        if success {
            println!("✅ Run {} complete", run_id);
        } else {
            eprintln!(
                "❌ Run stopped at index {}; resume with --resume-index {}",
                stop_index.unwrap(),
                stop_index.unwrap()
            );
        }

        RunReport {
            run_id,
            started_at,
            finished_at: Utc::now(),
            outcomes,
            stop_index,
            success,
        }
    }

    /// Block (by sleeping) until the bucket yields a publish token.
    ///
    /// The bucket itself never blocks; it reports the wait and we sleep it
    /// plus the configured safety margin. An expected, bounded delay, not an
    /// error.
    async fn wait_for_token(&mut self) {
        while !self.bucket.try_consume() {
            let wait = self.bucket.time_until_next_token() + self.limits.safety_margin();
            println!("⏳ Publish rate limit reached; waiting {:.1}s", wait.as_secs_f64());
            sleep(wait).await;
        }
    }
}
