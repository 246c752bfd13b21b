//! Run configuration consumed by the resolvers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::tenant::{TenantFilter, TenantId};

/// Which tenants and regions an archiving run covers.
///
/// # Example
///
/// ```
/// use tenant_archive::types::RunConfig;
///
/// let config = RunConfig::builder()
///     .regions(["DFW", "ORD"])
///     .tenant("t1")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.regions(), ["DFW", "ORD"]);
/// assert!(!config.tenant_ids().is_unrestricted());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Tenants to include; empty means all.
    #[serde(default)]
    tenant_ids: TenantFilter,
    /// Regions to archive, in order.
    regions: Vec<String>,
}

impl RunConfig {
    /// Creates a configuration without validating it.
    pub fn new(tenant_ids: TenantFilter, regions: Vec<String>) -> Self {
        Self {
            tenant_ids,
            regions,
        }
    }

    /// Returns a builder.
    pub fn builder() -> RunConfigBuilder {
        RunConfigBuilder::default()
    }

    /// The tenant filter.
    pub fn tenant_ids(&self) -> &TenantFilter {
        &self.tenant_ids
    }

    /// The requested regions, in order.
    pub fn regions(&self) -> &[String] {
        &self.regions
    }

    /// Checks that at least one region is requested and that regions are
    /// non-blank and unique.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.regions.is_empty() {
            return Err(ConfigError::NoRegions);
        }

        let mut seen = HashSet::with_capacity(self.regions.len());
        for (index, region) in self.regions.iter().enumerate() {
            if region.trim().is_empty() {
                return Err(ConfigError::BlankRegion { index });
            }
            if !seen.insert(region.as_str()) {
                return Err(ConfigError::DuplicateRegion {
                    region: region.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Builder for [`RunConfig`].
#[derive(Debug, Default)]
pub struct RunConfigBuilder {
    tenant_ids: Vec<TenantId>,
    regions: Vec<String>,
}

impl RunConfigBuilder {
    /// Restricts the run to one more tenant.
    pub fn tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_ids.push(tenant_id.into());
        self
    }

    /// Restricts the run to the given tenants.
    pub fn tenants<I, T>(mut self, tenant_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TenantId>,
    {
        self.tenant_ids.extend(tenant_ids.into_iter().map(Into::into));
        self
    }

    /// Appends one region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.regions.push(region.into());
        self
    }

    /// Appends regions in order.
    pub fn regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions.extend(regions.into_iter().map(Into::into));
        self
    }

    /// Builds and validates the configuration.
    pub fn build(self) -> Result<RunConfig, ConfigError> {
        let config = RunConfig::new(TenantFilter::only(self.tenant_ids), self.regions);
        config.validate()?;
        Ok(config)
    }
}
