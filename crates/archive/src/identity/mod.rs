//! Identity service seam and impersonation token resolution.
//!
//! The archiving job writes to a tenant's containers as that tenant's admin.
//! For every tenant it asks an [`IdentityService`] for the admin principal and
//! then for an impersonation token issued against the job's own caller token.
//!
//! - [`IdentityService`] - the external collaborator, implemented by clients
//! - [`ImpersonationResolver`] - fans out per-tenant calls and partitions results
//! - [`InMemoryIdentityService`] - fixture-backed service for dry runs and tests

mod memory;
mod resolver;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{IdentityResult, TenantError};
use crate::tenant::TenantId;

pub use memory::{IdentityFixture, InMemoryIdentityService};
pub use resolver::{DEFAULT_MAX_CONCURRENCY, ImpersonationResolver, TokenResolution};

/// A bearer credential.
///
/// Used both for the job's own caller token and for issued impersonation
/// tokens. The value never appears in `Debug` output.
///
/// ```
/// use tenant_archive::identity::AccessToken;
///
/// let token = AccessToken::new("s3cr3t");
/// assert_eq!(format!("{:?}", token), "AccessToken(***)");
/// assert_eq!(token.expose(), "s3cr3t");
/// ```
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the token is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(***)")
    }
}

/// A tenant's administrative user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Identity-service user id.
    pub user_id: String,
    /// Login name, when the service reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Principal {
    /// Creates a principal with no username.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
        }
    }

    /// Sets the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.username {
            Some(name) => write!(f, "{} ({})", self.user_id, name),
            None => write!(f, "{}", self.user_id),
        }
    }
}

/// The identity service used to act on a tenant's behalf.
///
/// Both calls may fail independently per tenant. Implementations own their
/// timeout and retry policy; callers do not retry.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Looks up the admin principal of a tenant.
    async fn tenant_admin(&self, tenant_id: &TenantId) -> IdentityResult<Principal>;

    /// Issues a token that lets `caller_token`'s holder act as `principal`.
    async fn impersonate(
        &self,
        principal: &Principal,
        caller_token: &AccessToken,
    ) -> IdentityResult<AccessToken>;
}

/// The terminal result of resolving one tenant's write credential.
#[derive(Debug, Clone)]
pub enum ImpersonationOutcome {
    /// A token was issued.
    Granted {
        /// The tenant.
        tenant_id: TenantId,
        /// Token to write with.
        token: AccessToken,
    },
    /// Lookup or issuance failed.
    Failed(TenantError),
}

impl ImpersonationOutcome {
    /// The tenant this outcome belongs to.
    pub fn tenant_id(&self) -> &TenantId {
        match self {
            ImpersonationOutcome::Granted { tenant_id, .. } => tenant_id,
            ImpersonationOutcome::Failed(err) => err.tenant_id(),
        }
    }

    /// Returns `true` for a granted token.
    pub fn is_granted(&self) -> bool {
        matches!(self, ImpersonationOutcome::Granted { .. })
    }
}

/// Resolves one tenant's impersonation token.
///
/// Looks up the tenant's admin, then impersonates it. Each failure is tagged
/// with the step it came from.
pub async fn impersonate_tenant(
    service: &dyn IdentityService,
    tenant_id: TenantId,
    caller_token: &AccessToken,
) -> ImpersonationOutcome {
    let principal = match service.tenant_admin(&tenant_id).await {
        Ok(principal) => principal,
        Err(source) => {
            return ImpersonationOutcome::Failed(TenantError::IdentityLookupFailure {
                tenant_id,
                source,
            });
        }
    };

    match service.impersonate(&principal, caller_token).await {
        Ok(token) => ImpersonationOutcome::Granted { tenant_id, token },
        Err(source) => {
            ImpersonationOutcome::Failed(TenantError::ImpersonationFailure { tenant_id, source })
        }
    }
}
