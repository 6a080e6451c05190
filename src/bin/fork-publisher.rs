//! fork-publisher CLI
//!
//! Renames a multi-crate workspace to its forked identity and publishes it
//! to crates.io in dependency order, within the registry's rate limits.

use anyhow::Result;
use clap::{Parser, Subcommand};
use fork_publisher::manifest::{load_order, validate_order};
use fork_publisher::{
    Auditor, CargoPublishAction, CratesIoChecker, ForkConfig, ManifestRewriter,
    PublishOrchestrator, RenameRule, TokenProvider,
};
use std::path::PathBuf;
use std::process;

/// Fork rename and rate-limited publish assistant
#[derive(Parser)]
#[command(name = "fork-publisher")]
#[command(version)]
#[command(about = "Rename and publish a forked crate workspace", long_about = None)]
struct Cli {
    /// Workspace root (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    workspace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every configured manifest to the forked identity
    Rename {
        /// Target release version (semver)
        #[arg(long)]
        version: String,
    },

    /// Publish the configured crates in order
    Publish {
        /// Position in the crate order to resume from (earlier entries are
        /// skipped without any registry activity)
        #[arg(long, default_value = "0")]
        resume_index: usize,

        /// Skip the up-front topological-order check
        #[arg(long)]
        no_order_check: bool,
    },

    /// Report which forked crates are published, and at which versions
    Audit,
}

#[tokio::main]
async fn main() {
    let result = run().await;

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("\n❌ Error");
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = ForkConfig::load(&cli.workspace)?;

    match cli.command {
        Commands::Rename { version } => rename_command(&cli.workspace, &config, &version),
        Commands::Publish {
            resume_index,
            no_order_check,
        } => publish_command(&cli.workspace, &config, resume_index, no_order_check).await,
        Commands::Audit => audit_command(&cli.workspace, &config).await,
    }
}

fn rename_command(workspace: &PathBuf, config: &ForkConfig, version: &str) -> Result<i32> {
    println!("\n📦 fork-publisher rename → v{}\n", version);

    let rule = RenameRule::from_config(&config.rename);
    let rewriter = ManifestRewriter::new(rule, version)?;

    let mut changed = 0;
    for crate_dir in &config.crates {
        let manifest_path = workspace.join(crate_dir).join("Cargo.toml");
        if rewriter.rewrite_file(&manifest_path)? {
            println!("✏️  {}", manifest_path.display());
            changed += 1;
        } else {
            println!("✅ {} (already up to date)", manifest_path.display());
        }
    }

    println!("\n✅ Rewrote {} of {} manifests", changed, config.crates.len());
    Ok(0)
}

async fn publish_command(
    workspace: &PathBuf,
    config: &ForkConfig,
    resume_index: usize,
    no_order_check: bool,
) -> Result<i32> {
    println!("\n📦 fork-publisher publish\n");

    // Fail before any network activity: token, manifests, order.
    let token = TokenProvider::new().require_token()?;
    let order = load_order(workspace, &config.crates)?;

    if no_order_check {
        eprintln!("⚠️  Skipping publish-order validation");
    } else {
        validate_order(&order)?;
    }

    println!(
        "Rate limits: burst {}, refill 1/{}s, API spacing {:.1}s\n",
        config.rate_limit.burst, config.rate_limit.refill_secs, config.rate_limit.api_spacing_secs
    );

    let mut orchestrator = PublishOrchestrator::new(
        Box::new(CratesIoChecker::new()),
        Box::new(CargoPublishAction::new(workspace.clone())),
        config.rate_limit.clone(),
    );

    let report = orchestrator.run(&order, resume_index, &token).await;

    println!("\n{}", "=".repeat(60));
    println!("📊 Run {} summary", report.run_id);
    println!("{}", "=".repeat(60));
    for (index, (name, outcome)) in report.outcomes.iter().enumerate() {
        println!("  [{}] {} — {:?}", index, name, outcome);
    }
    println!(
        "Published {} package(s) in {}s",
        report.published_count(),
        (report.finished_at - report.started_at).num_seconds()
    );

    if report.success {
        println!("\n✅ Publish run completed successfully!");
        Ok(0)
    } else {
        let stop = report.stop_index.unwrap_or(0);
        eprintln!(
            "\n❌ Publish run stopped at index {}; fix the failure and re-run with --resume-index {}",
            stop, stop
        );
        Ok(1)
    }
}

async fn audit_command(workspace: &PathBuf, config: &ForkConfig) -> Result<i32> {
    println!("\n🔍 fork-publisher audit\n");

    let auditor = Auditor::new(
        CratesIoChecker::new(),
        RenameRule::from_config(&config.rename),
        config.rate_limit.api_spacing(),
    );

    let rows = auditor.audit_workspace(workspace).await;

    println!("{:<30} | {:<40} | Versions", "Original", "Published");
    println!("{}", "-".repeat(100));
    for row in &rows {
        let versions = match (&row.versions, &row.error) {
            (_, Some(e)) => format!("error: {}", e),
            (None, None) => "(not published)".to_string(),
            (Some(v), None) => v.join(", "),
        };
        println!("{:<30} | {:<40} | {}", row.original, row.published, versions);
    }

    Ok(0)
}
