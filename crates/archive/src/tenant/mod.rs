//! Tenant identity and selection.
//!
//! - [`TenantId`] - Opaque tenant identifier, exactly as the preference store reports it
//! - [`TenantFilter`] - The tenants a run is restricted to (empty means all)

mod filter;
mod id;

pub use filter::TenantFilter;
pub use id::TenantId;
