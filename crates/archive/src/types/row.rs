//! Raw preference rows as yielded by the preference store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// One tenant's archiving preferences as stored.
///
/// The payload is kept as opaque JSON text; it is only interpreted for
/// enabled tenants that pass the run's tenant filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPreferenceRow {
    /// The owning tenant.
    pub tenant_id: TenantId,
    /// Preference payload (JSON text).
    pub payload: String,
    /// Secondary tenant identifier used by downstream systems.
    #[serde(default)]
    pub alternate_id: Option<String>,
    /// When the preferences were first stored.
    pub created: DateTime<Utc>,
    /// When the preferences were last changed.
    pub updated: DateTime<Utc>,
    /// Whether archiving applies to this tenant at all.
    pub enabled: bool,
}

impl RawPreferenceRow {
    /// Creates an enabled row with `created == updated == now`.
    pub fn new(tenant_id: impl Into<TenantId>, payload: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            tenant_id: tenant_id.into(),
            payload: payload.into(),
            alternate_id: None,
            created: now,
            updated: now,
            enabled: true,
        }
    }

    /// Sets the alternate id.
    pub fn with_alternate_id(mut self, alternate_id: impl Into<String>) -> Self {
        self.alternate_id = Some(alternate_id.into());
        self
    }

    /// Sets the enabled flag.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the last-updated timestamp.
    pub fn with_updated(mut self, updated: DateTime<Utc>) -> Self {
        self.updated = updated;
        self
    }
}
