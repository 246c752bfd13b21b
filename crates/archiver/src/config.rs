//! Command line and environment configuration for the archiver.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `ARCHIVE_ROWS_PATH` | preferences.ndjson | Preference rows (NDJSON) |
//! | `ARCHIVE_REGIONS` | | Regions to archive (comma-separated) |
//! | `ARCHIVE_TENANTS` | | Tenants to include (comma-separated, empty = all) |
//! | `ARCHIVE_IDENTITY_FIXTURE` | identity.json | Identity fixture (JSON) |
//! | `ARCHIVE_CALLER_TOKEN` | | Token the job authenticates with |
//! | `ARCHIVE_WORKERS` | 0 | Preference worker threads (0 = one per core) |
//! | `ARCHIVE_MAX_CONCURRENCY` | 16 | Identity calls in flight |
//! | `ARCHIVE_OUTPUT` | | Report path (stdout when unset) |
//! | `ARCHIVE_LOG_LEVEL` | info | Log level |

use std::path::PathBuf;

use clap::Parser;
use tenant_archive::identity::DEFAULT_MAX_CONCURRENCY;
use tenant_archive::tenant::TenantFilter;
use tenant_archive::types::RunConfig;

/// Archiver configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "tenant-archiver")]
#[command(about = "Resolve archive destinations and write credentials for every tenant")]
pub struct ArchiverConfig {
    /// NDJSON file with one preference row per line.
    #[arg(long, env = "ARCHIVE_ROWS_PATH", default_value = "preferences.ndjson")]
    pub rows: PathBuf,

    /// Regions to archive (comma-separated).
    #[arg(long, env = "ARCHIVE_REGIONS", default_value = "")]
    pub regions: String,

    /// Tenants to include (comma-separated, empty for all).
    #[arg(long, env = "ARCHIVE_TENANTS", default_value = "")]
    pub tenants: String,

    /// JSON fixture for the identity service.
    #[arg(long, env = "ARCHIVE_IDENTITY_FIXTURE", default_value = "identity.json")]
    pub identity_fixture: PathBuf,

    /// Token the job authenticates with when impersonating tenant admins.
    #[arg(
        long,
        env = "ARCHIVE_CALLER_TOKEN",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub caller_token: String,

    /// Preference worker threads (0 uses one per core).
    #[arg(long, env = "ARCHIVE_WORKERS", default_value = "0")]
    pub workers: usize,

    /// Maximum identity calls in flight.
    #[arg(long, env = "ARCHIVE_MAX_CONCURRENCY", default_value = "16")]
    pub max_concurrency: usize,

    /// Where to write the plan report; stdout when absent.
    #[arg(long, env = "ARCHIVE_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "ARCHIVE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Default for ArchiverConfig {
    fn default() -> Self {
        Self {
            rows: PathBuf::from("preferences.ndjson"),
            regions: String::new(),
            tenants: String::new(),
            identity_fixture: PathBuf::from("identity.json"),
            caller_token: String::new(),
            workers: 0,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            output: None,
            log_level: "info".to_string(),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ArchiverConfig {
    /// Requested regions, in order.
    pub fn region_list(&self) -> Vec<String> {
        split_list(&self.regions)
    }

    /// Requested tenants; empty means all.
    pub fn tenant_list(&self) -> Vec<String> {
        split_list(&self.tenants)
    }

    /// The run configuration for the library.
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(
            TenantFilter::only(self.tenant_list()),
            self.region_list(),
        )
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if let Err(e) = self.run_config().validate() {
            errors.push(format!("Invalid regions: {}", e));
        }

        if self.caller_token.trim().is_empty() {
            errors.push("Caller token cannot be empty".to_string());
        }

        if self.max_concurrency == 0 {
            errors.push("Max concurrency cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
