//! Fixture-backed identity service.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{IdentityError, IdentityResult};
use crate::tenant::TenantId;

use super::{AccessToken, IdentityService, Principal};

/// Static identity data: who administers each tenant, and which token each
/// administrator may be impersonated with.
///
/// ```json
/// {
///   "admins": { "t1": { "user_id": "u1", "username": "acme-admin" } },
///   "tokens": { "u1": "imp-token-1" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityFixture {
    /// Tenant to admin principal.
    #[serde(default)]
    pub admins: HashMap<TenantId, Principal>,
    /// Admin user id to issued token.
    #[serde(default)]
    pub tokens: HashMap<String, AccessToken>,
}

impl IdentityFixture {
    /// Parses a fixture from JSON text.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// An [`IdentityService`] answering from an [`IdentityFixture`].
///
/// Tenants without an admin fail the lookup; admins without a token fail
/// impersonation; a blank caller token is always rejected.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityService {
    fixture: IdentityFixture,
}

impl InMemoryIdentityService {
    /// Creates an empty service; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service from fixture data.
    pub fn from_fixture(fixture: IdentityFixture) -> Self {
        Self { fixture }
    }

    /// Registers a tenant's admin.
    pub fn with_admin(mut self, tenant_id: impl Into<TenantId>, principal: Principal) -> Self {
        self.fixture.admins.insert(tenant_id.into(), principal);
        self
    }

    /// Registers the token issued when impersonating `user_id`.
    pub fn with_token(mut self, user_id: impl Into<String>, token: AccessToken) -> Self {
        self.fixture.tokens.insert(user_id.into(), token);
        self
    }

    /// Number of tenants with a registered admin.
    pub fn admin_count(&self) -> usize {
        self.fixture.admins.len()
    }
}

#[async_trait]
impl IdentityService for InMemoryIdentityService {
    async fn tenant_admin(&self, tenant_id: &TenantId) -> IdentityResult<Principal> {
        self.fixture
            .admins
            .get(tenant_id)
            .cloned()
            .ok_or_else(|| IdentityError::AdminNotFound {
                tenant_id: tenant_id.clone(),
            })
    }

    async fn impersonate(
        &self,
        principal: &Principal,
        caller_token: &AccessToken,
    ) -> IdentityResult<AccessToken> {
        if caller_token.is_blank() {
            return Err(IdentityError::Rejected {
                message: "caller token is missing".to_string(),
            });
        }

        self.fixture
            .tokens
            .get(&principal.user_id)
            .cloned()
            .ok_or_else(|| IdentityError::Rejected {
                message: format!("no impersonation grant for user {}", principal.user_id),
            })
    }
}
