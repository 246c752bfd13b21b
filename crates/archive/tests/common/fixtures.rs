//! Test fixtures for preference rows and identity services.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use tenant_archive::error::{IdentityError, IdentityResult};
use tenant_archive::identity::{AccessToken, IdentityService, Principal};
use tenant_archive::tenant::TenantId;
use tenant_archive::types::{RawPreferenceRow, RunConfig};

/// A preference row fixture with a payload built field by field.
#[derive(Debug, Clone)]
pub struct PreferenceRowFixture {
    /// Tenant id.
    pub tenant_id: String,
    /// Alternate id.
    pub alternate_id: Option<String>,
    /// Archive formats; `None` leaves `data_format` out of the payload.
    pub formats: Option<Vec<String>>,
    /// Default container value, emitted verbatim (may be JSON null).
    pub default_container: Option<Value>,
    /// Per-region overrides; `None` leaves the map out.
    pub overrides: Option<Map<String, Value>>,
    /// Enabled flag.
    pub enabled: bool,
}

impl PreferenceRowFixture {
    /// An enabled tenant archiving JSON with no containers configured.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            alternate_id: None,
            formats: Some(vec!["JSON".to_string()]),
            default_container: None,
            overrides: None,
            enabled: true,
        }
    }

    /// Sets the default container.
    pub fn with_default(mut self, container: &str) -> Self {
        self.default_container = Some(Value::String(container.to_string()));
        self
    }

    /// Sets the default container to JSON null.
    pub fn with_null_default(mut self) -> Self {
        self.default_container = Some(Value::Null);
        self
    }

    /// Adds a per-region override.
    pub fn with_override(mut self, region: &str, container: &str) -> Self {
        self.overrides
            .get_or_insert_with(Map::new)
            .insert(region.to_string(), Value::String(container.to_string()));
        self
    }

    /// Adds a per-region override set to JSON null.
    pub fn with_null_override(mut self, region: &str) -> Self {
        self.overrides
            .get_or_insert_with(Map::new)
            .insert(region.to_string(), Value::Null);
        self
    }

    /// Includes an empty override map.
    pub fn with_empty_overrides(mut self) -> Self {
        self.overrides = Some(Map::new());
        self
    }

    /// Sets the formats.
    pub fn with_formats(mut self, formats: &[&str]) -> Self {
        self.formats = Some(formats.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Removes `data_format` from the payload.
    pub fn without_formats(mut self) -> Self {
        self.formats = None;
        self
    }

    /// Sets the alternate id.
    pub fn with_alternate_id(mut self, alternate_id: &str) -> Self {
        self.alternate_id = Some(alternate_id.to_string());
        self
    }

    /// Disables archiving.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Renders the payload JSON.
    pub fn payload(&self) -> Value {
        let mut payload = Map::new();
        if let Some(formats) = &self.formats {
            payload.insert("data_format".to_string(), json!(formats));
        }
        if let Some(default) = &self.default_container {
            payload.insert("default_archive_container_url".to_string(), default.clone());
        }
        if let Some(overrides) = &self.overrides {
            payload.insert(
                "archive_container_urls".to_string(),
                Value::Object(overrides.clone()),
            );
        }
        Value::Object(payload)
    }

    /// Builds the raw row.
    pub fn build(&self) -> RawPreferenceRow {
        let mut row = RawPreferenceRow::new(self.tenant_id.as_str(), self.payload().to_string())
            .with_enabled(self.enabled);
        row.alternate_id = self.alternate_id.clone();
        row
    }
}

/// A row whose payload is arbitrary text.
pub fn raw_row(tenant_id: &str, payload: &str) -> RawPreferenceRow {
    RawPreferenceRow::new(tenant_id, payload)
}

/// A validated run configuration.
pub fn run_config(regions: &[&str], tenants: &[&str]) -> RunConfig {
    RunConfig::builder()
        .regions(regions.iter().copied())
        .tenants(tenants.iter().copied())
        .build()
        .expect("valid run config")
}

/// An identity service with scripted per-tenant behavior.
///
/// Every tenant gets admin `admin-<tenant>` and token
/// `token-<tenant>` unless scripted to fail. All lookups are recorded.
#[derive(Default)]
pub struct ScriptedIdentityService {
    lookup_failures: HashSet<String>,
    impersonation_failures: HashSet<String>,
    lookups: Mutex<Vec<String>>,
}

impl ScriptedIdentityService {
    /// A service where every call succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the admin lookup fail for `tenant_id`.
    pub fn fail_lookup(mut self, tenant_id: &str) -> Self {
        self.lookup_failures.insert(tenant_id.to_string());
        self
    }

    /// Makes impersonation fail for `tenant_id`'s admin.
    pub fn fail_impersonation(mut self, tenant_id: &str) -> Self {
        self.impersonation_failures.insert(tenant_id.to_string());
        self
    }

    /// Tenants whose admin was looked up, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityService for ScriptedIdentityService {
    async fn tenant_admin(&self, tenant_id: &TenantId) -> IdentityResult<Principal> {
        self.lookups
            .lock()
            .unwrap()
            .push(tenant_id.as_str().to_string());

        if self.lookup_failures.contains(tenant_id.as_str()) {
            return Err(IdentityError::Unavailable {
                message: format!("lookup timed out for {}", tenant_id),
            });
        }
        Ok(Principal::new(format!("admin-{}", tenant_id)))
    }

    async fn impersonate(
        &self,
        principal: &Principal,
        caller_token: &AccessToken,
    ) -> IdentityResult<AccessToken> {
        let tenant = principal
            .user_id
            .strip_prefix("admin-")
            .unwrap_or(&principal.user_id);

        if self.impersonation_failures.contains(tenant) {
            return Err(IdentityError::Rejected {
                message: format!("{} may not impersonate {}", caller_token.expose(), principal),
            });
        }
        Ok(AccessToken::new(format!("token-{}", tenant)))
    }
}

/// Collects tokens into plain strings for comparison.
pub fn exposed(tokens: &HashMap<TenantId, AccessToken>) -> HashMap<String, String> {
    tokens
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.expose().to_string()))
        .collect()
}
