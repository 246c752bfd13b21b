//! Partial-failure tolerant impersonation over a batch of tenants.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::error::{IdentityError, TenantError};
use crate::tenant::TenantId;

use super::{AccessToken, IdentityService, ImpersonationOutcome, impersonate_tenant};

/// Identity calls allowed in flight when no limit is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Tokens and failures from one impersonation pass.
///
/// Every distinct input tenant appears in exactly one of the two collections.
#[derive(Debug, Default)]
pub struct TokenResolution {
    /// Issued tokens keyed by tenant.
    pub tokens: HashMap<TenantId, AccessToken>,
    /// Tenants for which no token could be issued.
    pub errors: Vec<TenantError>,
}

impl TokenResolution {
    /// Files an outcome under tokens or errors.
    pub fn record(&mut self, outcome: ImpersonationOutcome) {
        match outcome {
            ImpersonationOutcome::Granted { tenant_id, token } => {
                self.tokens.insert(tenant_id, token);
            }
            ImpersonationOutcome::Failed(err) => self.errors.push(err),
        }
    }

    /// Total number of tenants accounted for.
    pub fn len(&self) -> usize {
        self.tokens.len() + self.errors.len()
    }

    /// Returns `true` if no tenant was processed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<ImpersonationOutcome> for TokenResolution {
    fn from_iter<I: IntoIterator<Item = ImpersonationOutcome>>(iter: I) -> Self {
        let mut resolution = TokenResolution::default();
        for outcome in iter {
            resolution.record(outcome);
        }
        resolution
    }
}

/// Resolves impersonation tokens for many tenants concurrently.
///
/// Each tenant runs as its own task; at most `max_concurrency` identity
/// calls are in flight. Failures are isolated per tenant and never retried.
/// Dropping the future returned by [`resolve_tokens`](Self::resolve_tokens)
/// aborts every in-flight call.
#[derive(Debug, Clone)]
pub struct ImpersonationResolver {
    max_concurrency: usize,
}

impl Default for ImpersonationResolver {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl ImpersonationResolver {
    /// Creates a resolver with [`DEFAULT_MAX_CONCURRENCY`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with the given concurrency limit (at least 1).
    pub fn with_max_concurrency(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// The configured concurrency limit.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// Resolves a write token for every distinct tenant.
    pub async fn resolve_tokens<I>(
        &self,
        caller_token: &AccessToken,
        tenants: I,
        service: Arc<dyn IdentityService>,
    ) -> TokenResolution
    where
        I: IntoIterator<Item = TenantId>,
    {
        let permits = Arc::new(Semaphore::new(self.max_concurrency));
        let mut tasks: JoinSet<ImpersonationOutcome> = JoinSet::new();
        let mut pending: HashSet<TenantId> = HashSet::new();

        for tenant_id in tenants {
            if !pending.insert(tenant_id.clone()) {
                continue;
            }

            let permits = permits.clone();
            let service = service.clone();
            let caller_token = caller_token.clone();

            tasks.spawn(async move {
                let _permit = match permits.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return ImpersonationOutcome::Failed(TenantError::IdentityLookupFailure {
                            tenant_id,
                            source: IdentityError::Internal {
                                message: "concurrency limiter closed".to_string(),
                            },
                        });
                    }
                };
                impersonate_tenant(service.as_ref(), tenant_id, &caller_token).await
            });
        }

        debug!(
            tenants = pending.len(),
            max_concurrency = self.max_concurrency,
            "Resolving impersonation tokens"
        );

        let mut resolution = TokenResolution::default();
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(outcome) => {
                    pending.remove(outcome.tenant_id());
                    if let ImpersonationOutcome::Failed(err) = &outcome {
                        warn!(
                            tenant_id = %err.tenant_id(),
                            stage = %err.stage(),
                            error = %err,
                            "Could not obtain impersonation token"
                        );
                    }
                    resolution.record(outcome);
                }
                Err(e) => {
                    warn!(error = %e, "Impersonation task failed");
                }
            }
        }

        // Tenants whose task panicked never reported back.
        for tenant_id in pending {
            resolution.record(ImpersonationOutcome::Failed(
                TenantError::ImpersonationFailure {
                    tenant_id,
                    source: IdentityError::Internal {
                        message: "impersonation task terminated unexpectedly".to_string(),
                    },
                },
            ));
        }

        info!(
            granted = resolution.tokens.len(),
            failed = resolution.errors.len(),
            "Resolved impersonation tokens"
        );

        resolution
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{FailureStage, IdentityResult};
    use crate::identity::Principal;

    /// Fails lookups for tenants named `bad-*`, panics for `panic-*`.
    struct ScriptedService {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedService {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl IdentityService for ScriptedService {
        async fn tenant_admin(&self, tenant_id: &TenantId) -> IdentityResult<Principal> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let id = tenant_id.as_str();
            if id.starts_with("panic-") {
                panic!("identity client crashed");
            }
            if id.starts_with("bad-") {
                return Err(IdentityError::AdminNotFound {
                    tenant_id: tenant_id.clone(),
                });
            }
            Ok(Principal::new(format!("admin-{}", id)))
        }

        async fn impersonate(
            &self,
            principal: &Principal,
            caller_token: &AccessToken,
        ) -> IdentityResult<AccessToken> {
            Ok(AccessToken::new(format!(
                "{}@{}",
                principal.user_id,
                caller_token.expose()
            )))
        }
    }

    fn ids(names: &[&str]) -> Vec<TenantId> {
        names.iter().map(|n| TenantId::new(*n)).collect()
    }

    #[tokio::test]
    async fn test_partitions_success_and_failure() {
        let resolver = ImpersonationResolver::new();
        let resolution = resolver
            .resolve_tokens(
                &AccessToken::new("job"),
                ids(&["t1", "bad-t2", "t3"]),
                Arc::new(ScriptedService::new()),
            )
            .await;

        assert_eq!(resolution.len(), 3);
        assert_eq!(resolution.tokens.len(), 2);
        assert_eq!(resolution.tokens["t1"].expose(), "admin-t1@job");
        assert_eq!(resolution.errors.len(), 1);
        assert_eq!(resolution.errors[0].tenant_id().as_str(), "bad-t2");
        assert_eq!(resolution.errors[0].stage(), FailureStage::IdentityLookup);
    }

    #[tokio::test]
    async fn test_duplicate_tenants_resolved_once() {
        let resolution = ImpersonationResolver::new()
            .resolve_tokens(
                &AccessToken::new("job"),
                ids(&["t1", "t1", "t1"]),
                Arc::new(ScriptedService::new()),
            )
            .await;
        assert_eq!(resolution.len(), 1);
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_failure() {
        let resolution = ImpersonationResolver::new()
            .resolve_tokens(
                &AccessToken::new("job"),
                ids(&["t1", "panic-t2"]),
                Arc::new(ScriptedService::new()),
            )
            .await;

        assert_eq!(resolution.tokens.len(), 1);
        assert_eq!(resolution.errors.len(), 1);
        assert_eq!(resolution.errors[0].tenant_id().as_str(), "panic-t2");
    }

    #[tokio::test]
    async fn test_respects_concurrency_limit() {
        let service = Arc::new(ScriptedService::new());
        let tenants: Vec<_> = (0..20).map(|i| TenantId::new(format!("t{}", i))).collect();

        let resolution = ImpersonationResolver::with_max_concurrency(3)
            .resolve_tokens(&AccessToken::new("job"), tenants, service.clone())
            .await;

        assert_eq!(resolution.tokens.len(), 20);
        assert!(service.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let resolution = ImpersonationResolver::new()
            .resolve_tokens(
                &AccessToken::new("job"),
                Vec::new(),
                Arc::new(ScriptedService::new()),
            )
            .await;
        assert!(resolution.is_empty());
    }

    #[test]
    fn test_zero_concurrency_clamped() {
        assert_eq!(ImpersonationResolver::with_max_concurrency(0).max_concurrency(), 1);
    }

    #[test]
    fn test_from_outcomes() {
        let resolution: TokenResolution = vec![
            ImpersonationOutcome::Granted {
                tenant_id: TenantId::new("t1"),
                token: AccessToken::new("x"),
            },
            ImpersonationOutcome::Failed(TenantError::IdentityLookupFailure {
                tenant_id: TenantId::new("t2"),
                source: IdentityError::Unavailable {
                    message: "down".to_string(),
                },
            }),
        ]
        .into_iter()
        .collect();

        assert_eq!(resolution.tokens.len(), 1);
        assert_eq!(resolution.errors.len(), 1);
    }
}
