//! Tenant-id filtering for a run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::TenantId;

/// The set of tenants a run is restricted to.
///
/// An empty filter admits every tenant.
///
/// ```
/// use tenant_archive::tenant::{TenantFilter, TenantId};
///
/// let all = TenantFilter::all();
/// assert!(all.admits(&TenantId::new("anyone")));
///
/// let only = TenantFilter::only(["t1", "t2"]);
/// assert!(only.admits(&TenantId::new("t1")));
/// assert!(!only.admits(&TenantId::new("t3")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantFilter(BTreeSet<TenantId>);

impl TenantFilter {
    /// A filter that admits every tenant.
    pub fn all() -> Self {
        Self::default()
    }

    /// A filter restricted to the given tenants.
    pub fn only<I, T>(tenants: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        Self(tenants.into_iter().map(Into::into).collect())
    }

    /// Returns `true` when no restriction is in place.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the tenant takes part in the run.
    pub fn admits(&self, tenant_id: &TenantId) -> bool {
        self.0.is_empty() || self.0.contains(tenant_id)
    }

    /// Number of explicitly requested tenants.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no tenant was explicitly requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the explicitly requested tenants.
    pub fn iter(&self) -> impl Iterator<Item = &TenantId> {
        self.0.iter()
    }
}

impl<T: Into<TenantId>> FromIterator<T> for TenantFilter {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::only(iter)
    }
}
