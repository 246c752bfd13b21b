//! Tenant Archiver
//!
//! Plans one archiving run: reads tenant preference rows, resolves the
//! archive container per requested region, obtains an impersonation token for
//! each tenant's admin and prints a report of the outcome.

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tenant_archive::identity::{
    AccessToken, IdentityFixture, ImpersonationResolver, InMemoryIdentityService,
};
use tenant_archive::planner::{ArchivePlan, ArchivePlanner};
use tenant_archive::preferences::PreferenceResolver;
use tenant_archive::source::NdjsonPreferenceSource;
use tracing::{info, warn};

use crate::config::ArchiverConfig;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("tenant_archive={},tenant_archiver={}", level, level))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn load_identity(config: &ArchiverConfig) -> anyhow::Result<InMemoryIdentityService> {
    let path = &config.identity_fixture;
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read identity fixture {}", path.display()))?;
    let fixture = IdentityFixture::from_json(&text)
        .with_context(|| format!("Invalid identity fixture {}", path.display()))?;

    let service = InMemoryIdentityService::from_fixture(fixture);
    info!(admins = service.admin_count(), "Loaded identity fixture");
    Ok(service)
}

async fn write_report(plan: &ArchivePlan, config: &ArchiverConfig) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&plan.report())?;

    match &config.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!(path = %path.display(), "Wrote archive plan report");
        }
        None => println!("{}", json),
    }
    Ok(())
}

async fn run(config: ArchiverConfig) -> anyhow::Result<()> {
    let identity = load_identity(&config).await?;
    let source = NdjsonPreferenceSource::new(&config.rows);
    let planner = ArchivePlanner::with_resolvers(
        PreferenceResolver::with_workers(config.workers)?,
        ImpersonationResolver::with_max_concurrency(config.max_concurrency),
    );
    let caller_token = AccessToken::new(config.caller_token.clone());

    let plan = planner
        .plan(
            &source,
            &config.run_config(),
            Arc::new(identity),
            &caller_token,
        )
        .await?;

    if !plan.is_clean() {
        warn!(
            failed = plan.errors.len(),
            "Some tenants could not be prepared for archiving"
        );
    }

    write_report(&plan, &config).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ArchiverConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        rows = %config.rows.display(),
        regions = ?config.region_list(),
        tenants = ?config.tenant_list(),
        workers = config.workers,
        max_concurrency = config.max_concurrency,
        "Starting tenant archive planning"
    );

    tokio::select! {
        result = run(config) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning archive run");
            anyhow::bail!("archive run cancelled")
        }
    }
}
