//! End-to-end planning of one archiving run.
//!
//! A run loads every preference row, resolves destinations for the enabled
//! tenants and then obtains a write credential for each tenant that resolved.
//! Per-tenant failures from both phases are gathered into one list; only
//! source and configuration faults fail the run.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::error::{ArchiveError, ArchiveResult, FailureRecord, TenantError};
use crate::identity::{AccessToken, IdentityService, ImpersonationResolver};
use crate::preferences::PreferenceResolver;
use crate::source::PreferenceSource;
use crate::tenant::TenantId;
use crate::types::{RunConfig, TenantPreferences};

/// Everything downstream stages need to archive a run.
#[derive(Debug)]
pub struct ArchivePlan {
    /// Identifier used to correlate logs of this run.
    pub run_id: Uuid,
    /// Regions requested for the run.
    pub regions: Vec<String>,
    /// Destinations and formats per tenant.
    pub preferences: HashMap<TenantId, TenantPreferences>,
    /// Write credentials per tenant.
    pub tokens: HashMap<TenantId, AccessToken>,
    /// Per-tenant failures from every phase.
    pub errors: Vec<TenantError>,
    /// Rows skipped because archiving was disabled.
    pub skipped_disabled: usize,
    /// Rows excluded by the tenant filter.
    pub filtered_out: usize,
}

impl ArchivePlan {
    /// Tenants that can be archived: destinations resolved and a token issued.
    pub fn ready_tenants(&self) -> impl Iterator<Item = &TenantPreferences> {
        self.preferences
            .values()
            .filter(|prefs| self.tokens.contains_key(prefs.tenant_id()))
    }

    /// Returns `true` if no tenant failed.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Builds a report that is safe to print: token values are omitted.
    pub fn report(&self) -> PlanReport {
        let mut tenants: Vec<TenantReport> = self
            .preferences
            .values()
            .map(|prefs| TenantReport {
                authorized: self.tokens.contains_key(prefs.tenant_id()),
                preferences: prefs.clone(),
            })
            .collect();
        tenants.sort_by(|a, b| a.preferences.tenant_id().cmp(b.preferences.tenant_id()));

        let mut failures: Vec<FailureRecord> =
            self.errors.iter().map(TenantError::to_record).collect();
        failures.sort_by(|a, b| a.tenant_id.cmp(&b.tenant_id).then(a.stage.cmp(&b.stage)));

        PlanReport {
            run_id: self.run_id,
            regions: self.regions.clone(),
            summary: PlanSummary {
                resolved: self.preferences.len(),
                authorized: self.tokens.len(),
                failed: self.errors.len(),
                skipped_disabled: self.skipped_disabled,
                filtered_out: self.filtered_out,
            },
            tenants,
            failures,
        }
    }
}

/// Serializable summary of an [`ArchivePlan`].
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    /// The run this report describes.
    pub run_id: Uuid,
    /// Requested regions, in order.
    pub regions: Vec<String>,
    /// Counts.
    pub summary: PlanSummary,
    /// Resolved tenants, sorted by tenant id.
    pub tenants: Vec<TenantReport>,
    /// Failures, sorted by tenant id then stage.
    pub failures: Vec<FailureRecord>,
}

/// Counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanSummary {
    /// Tenants with resolved preferences.
    pub resolved: usize,
    /// Tenants with a write token.
    pub authorized: usize,
    /// Per-tenant failures across both phases.
    pub failed: usize,
    /// Rows with archiving disabled.
    pub skipped_disabled: usize,
    /// Rows outside the tenant filter.
    pub filtered_out: usize,
}

/// One tenant's entry in a [`PlanReport`].
#[derive(Debug, Clone, Serialize)]
pub struct TenantReport {
    /// Resolved destinations and formats.
    #[serde(flatten)]
    pub preferences: TenantPreferences,
    /// Whether a write token was issued.
    pub authorized: bool,
}

/// Runs both resolution phases for a batch.
#[derive(Debug, Clone, Default)]
pub struct ArchivePlanner {
    preferences: PreferenceResolver,
    impersonation: ImpersonationResolver,
}

impl ArchivePlanner {
    /// Creates a planner with default resolvers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a planner from explicitly configured resolvers.
    pub fn with_resolvers(
        preferences: PreferenceResolver,
        impersonation: ImpersonationResolver,
    ) -> Self {
        Self {
            preferences,
            impersonation,
        }
    }

    /// Plans one run.
    ///
    /// Fails only if the configuration is invalid, the source cannot deliver
    /// rows, or the resolution task dies. Tenant-level problems are returned
    /// in [`ArchivePlan::errors`].
    pub async fn plan(
        &self,
        source: &dyn PreferenceSource,
        config: &RunConfig,
        identity: Arc<dyn IdentityService>,
        caller_token: &AccessToken,
    ) -> ArchiveResult<ArchivePlan> {
        config.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("archive_run", run_id = %run_id, source = source.name());

        async move {
            let rows = source.fetch_rows().await?;
            info!(rows = rows.len(), regions = ?config.regions(), "Planning archive run");

            let resolver = self.preferences.clone();
            let run_config = config.clone();
            let resolution =
                tokio::task::spawn_blocking(move || resolver.resolve(&rows, &run_config))
                    .await
                    .map_err(|e| ArchiveError::Resolution {
                        message: e.to_string(),
                    })?;

            let tokens = self
                .impersonation
                .resolve_tokens(
                    caller_token,
                    resolution.preferences.keys().cloned(),
                    identity,
                )
                .await;

            let mut errors = resolution.errors;
            errors.extend(tokens.errors);

            let plan = ArchivePlan {
                run_id,
                regions: config.regions().to_vec(),
                preferences: resolution.preferences,
                tokens: tokens.tokens,
                errors,
                skipped_disabled: resolution.skipped_disabled,
                filtered_out: resolution.filtered_out,
            };

            info!(
                resolved = plan.preferences.len(),
                authorized = plan.tokens.len(),
                failed = plan.errors.len(),
                "Archive run planned"
            );

            Ok::<_, ArchiveError>(plan)
        }
        .instrument(span)
        .await
    }
}
