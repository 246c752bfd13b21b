//! Resolved per-tenant archive preferences.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// Where and in which formats a tenant's archives are written.
///
/// Built once by the preference resolver and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantPreferences {
    tenant_id: TenantId,
    alternate_id: String,
    containers: BTreeMap<String, String>,
    formats: Vec<String>,
}

impl TenantPreferences {
    /// Creates a new preferences record.
    pub fn new(
        tenant_id: TenantId,
        alternate_id: impl Into<String>,
        containers: BTreeMap<String, String>,
        formats: Vec<String>,
    ) -> Self {
        Self {
            tenant_id,
            alternate_id: alternate_id.into(),
            containers,
            formats,
        }
    }

    /// The owning tenant.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// The tenant's alternate id, possibly empty.
    pub fn alternate_id(&self) -> &str {
        &self.alternate_id
    }

    /// Region to container mapping. Regions without a container are absent.
    pub fn containers(&self) -> &BTreeMap<String, String> {
        &self.containers
    }

    /// Container for a single region, if one was resolved.
    pub fn container_for(&self, region: &str) -> Option<&str> {
        self.containers.get(region).map(String::as_str)
    }

    /// Archive formats in payload order.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Returns `true` if no region received a container.
    ///
    /// Such a tenant produces no archive output in this run.
    pub fn has_no_destinations(&self) -> bool {
        self.containers.is_empty()
    }
}
