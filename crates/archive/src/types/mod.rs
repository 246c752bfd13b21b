//! Core data types shared by the resolvers.
//!
//! - [`RawPreferenceRow`] - A tenant's stored preferences, payload still unparsed
//! - [`TenantPreferences`] - Resolved containers and formats for one enabled tenant
//! - [`RunConfig`] - Tenant filter and requested regions for a run

mod preferences;
mod row;
mod run_config;

pub use preferences::TenantPreferences;
pub use row::RawPreferenceRow;
pub use run_config::{RunConfig, RunConfigBuilder};
