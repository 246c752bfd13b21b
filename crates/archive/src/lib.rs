//! Tenant Archive Resolution
//!
//! This crate decides, for every tenant in a bulk archiving run, *where* the
//! tenant's archive files go and *with what authorization* they are written.
//! It does not decide what to archive or how to format it.
//!
//! # Architecture
//!
//! - [`tenant`] - Tenant identifiers and run-level tenant filtering
//! - [`types`] - Raw preference rows, resolved preferences, run configuration
//! - [`preferences`] - Payload parsing, container fallback rules, batch resolution
//! - [`identity`] - Identity service seam and concurrent impersonation
//! - [`source`] - Where raw preference rows are loaded from
//! - [`planner`] - Both phases combined into one run plan
//! - [`error`] - Per-tenant and batch-fatal error types
//!
//! # Failure model
//!
//! Per-tenant problems (a malformed payload, a missing admin, a refused
//! impersonation) are returned next to the successful results as
//! [`TenantError`](error::TenantError)s; they never abort the batch. Only an
//! unusable source or configuration fails a run.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use tenant_archive::identity::{AccessToken, InMemoryIdentityService, Principal};
//! use tenant_archive::planner::ArchivePlanner;
//! use tenant_archive::source::StaticPreferenceSource;
//! use tenant_archive::types::{RawPreferenceRow, RunConfig};
//!
//! # let rt = tokio::runtime::Runtime::new().unwrap();
//! # rt.block_on(async {
//! let source = StaticPreferenceSource::new(vec![RawPreferenceRow::new(
//!     "acme",
//!     r#"{"data_format": ["JSON"],
//!         "default_archive_container_url": "C1",
//!         "archive_container_urls": {"DFW": "C2"}}"#,
//! )]);
//! let identity = InMemoryIdentityService::new()
//!     .with_admin("acme", Principal::new("u-1"))
//!     .with_token("u-1", AccessToken::new("imp-token"));
//! let config = RunConfig::builder().regions(["DFW", "ORD"]).build().unwrap();
//!
//! let plan = ArchivePlanner::new()
//!     .plan(&source, &config, Arc::new(identity), &AccessToken::new("job-token"))
//!     .await
//!     .unwrap();
//!
//! let acme = &plan.preferences["acme"];
//! assert_eq!(acme.container_for("DFW"), Some("C2"));
//! assert_eq!(acme.container_for("ORD"), Some("C1"));
//! assert_eq!(plan.tokens["acme"].expose(), "imp-token");
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod identity;
pub mod planner;
pub mod preferences;
pub mod source;
pub mod tenant;
pub mod types;

pub use error::{ArchiveError, ArchiveResult, TenantError};
