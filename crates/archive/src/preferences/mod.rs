//! Archive preference resolution.
//!
//! Turns raw preference rows into [`TenantPreferences`](crate::types::TenantPreferences):
//!
//! - [`payload`] - typed parsing of the preference payload
//! - [`containers`] - the per-region container fallback rules
//! - [`resolver`] - filtering, enablement and parallel batch resolution

pub mod containers;
pub mod payload;
pub mod resolver;

pub use containers::{is_blank, resolve_containers};
pub use payload::{ArchivePayload, DATA_FORMAT_FIELD, parse_payload};
pub use resolver::{PreferenceResolution, PreferenceResolver, resolve_row};
