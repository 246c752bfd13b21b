//! Batch resolution of raw preference rows into [`TenantPreferences`].

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::{ArchiveResult, TenantError};
use crate::tenant::TenantId;
use crate::types::{RawPreferenceRow, RunConfig, TenantPreferences};

use super::containers::resolve_containers;
use super::payload::parse_payload;

/// Output of a preference resolution pass.
///
/// Every row admitted by the tenant filter ends up in exactly one of
/// `preferences`, `errors` or the `skipped_disabled` count.
#[derive(Debug, Default)]
pub struct PreferenceResolution {
    /// Resolved preferences keyed by tenant.
    pub preferences: HashMap<TenantId, TenantPreferences>,
    /// Tenants whose payload could not be used.
    pub errors: Vec<TenantError>,
    /// Enabled flag was off.
    pub skipped_disabled: usize,
    /// Rows excluded by the tenant filter.
    pub filtered_out: usize,
    /// Older rows dropped because a newer row for the same tenant existed.
    pub superseded: usize,
}

impl PreferenceResolution {
    fn absorb(mut self, outcome: RowOutcome) -> Self {
        match outcome {
            RowOutcome::Resolved(prefs) => {
                self.preferences.insert(prefs.tenant_id().clone(), prefs);
            }
            RowOutcome::Failed(err) => self.errors.push(err),
            RowOutcome::Disabled => self.skipped_disabled += 1,
        }
        self
    }

    fn merge(mut self, other: Self) -> Self {
        self.preferences.extend(other.preferences);
        self.errors.extend(other.errors);
        self.skipped_disabled += other.skipped_disabled;
        self.filtered_out += other.filtered_out;
        self.superseded += other.superseded;
        self
    }

    /// Number of tenants that produced a preferences record.
    pub fn resolved_count(&self) -> usize {
        self.preferences.len()
    }
}

enum RowOutcome {
    Resolved(TenantPreferences),
    Failed(TenantError),
    Disabled,
}

/// Resolves one row, ignoring its enabled flag.
///
/// Containers are computed against `regions`; the alternate id defaults to
/// an empty string.
pub fn resolve_row(
    row: &RawPreferenceRow,
    regions: &[String],
) -> Result<TenantPreferences, TenantError> {
    let payload = parse_payload(&row.payload).map_err(|source| TenantError::MalformedPayload {
        tenant_id: row.tenant_id.clone(),
        source,
    })?;

    let containers = resolve_containers(
        regions,
        payload.default_container(),
        payload.container_overrides(),
    );

    Ok(TenantPreferences::new(
        row.tenant_id.clone(),
        row.alternate_id.clone().unwrap_or_default(),
        containers,
        payload.into_formats(),
    ))
}

fn resolve_enabled(row: &RawPreferenceRow, regions: &[String]) -> RowOutcome {
    if !row.enabled {
        debug!(tenant_id = %row.tenant_id, "Archiving disabled for tenant, skipping");
        return RowOutcome::Disabled;
    }

    match resolve_row(row, regions) {
        Ok(prefs) => {
            if prefs.has_no_destinations() {
                debug!(
                    tenant_id = %row.tenant_id,
                    "No container configured for any requested region"
                );
            }
            RowOutcome::Resolved(prefs)
        }
        Err(err) => {
            warn!(tenant_id = %row.tenant_id, error = %err, "Rejected preference payload");
            RowOutcome::Failed(err)
        }
    }
}

/// Keeps the most recently updated row per tenant.
///
/// Ties go to the row that appears later in the input.
fn latest_rows<'a, I>(rows: I) -> (Vec<&'a RawPreferenceRow>, usize)
where
    I: IntoIterator<Item = &'a RawPreferenceRow>,
{
    let mut latest: HashMap<&TenantId, &RawPreferenceRow> = HashMap::new();
    let mut superseded = 0;

    for row in rows {
        match latest.entry(&row.tenant_id) {
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
            Entry::Occupied(mut slot) => {
                superseded += 1;
                if row.updated >= slot.get().updated {
                    slot.insert(row);
                }
            }
        }
    }

    (latest.into_values().collect(), superseded)
}

/// Resolves raw rows into per-tenant preferences on a bounded worker pool.
///
/// Rows are processed independently; one tenant's malformed payload is
/// recorded as a [`TenantError`] and never stops the others.
///
/// ```
/// use tenant_archive::preferences::PreferenceResolver;
/// use tenant_archive::types::{RawPreferenceRow, RunConfig};
///
/// let config = RunConfig::builder().regions(["DFW", "ORD"]).build().unwrap();
/// let rows = vec![
///     RawPreferenceRow::new("t1", r#"{"data_format": ["JSON"], "default_archive_container_url": "C1"}"#),
///     RawPreferenceRow::new("t2", "not json"),
///     RawPreferenceRow::new("t3", r#"{"data_format": ["JSON"]}"#).with_enabled(false),
/// ];
///
/// let resolution = PreferenceResolver::new().resolve(&rows, &config);
/// assert_eq!(resolution.preferences.len(), 1);
/// assert_eq!(resolution.errors.len(), 1);
/// assert_eq!(resolution.skipped_disabled, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PreferenceResolver {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl PreferenceResolver {
    /// Creates a resolver that runs on rayon's global pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with a dedicated pool of `workers` threads.
    ///
    /// `0` falls back to the global pool.
    pub fn with_workers(workers: usize) -> ArchiveResult<Self> {
        if workers == 0 {
            return Ok(Self::new());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("archive-prefs-{}", index))
            .build()?;

        Ok(Self {
            pool: Some(Arc::new(pool)),
        })
    }

    /// Resolves every row admitted by the run's tenant filter.
    pub fn resolve(&self, rows: &[RawPreferenceRow], config: &RunConfig) -> PreferenceResolution {
        let filter = config.tenant_ids();
        let regions = config.regions();

        let admitted = rows.iter().filter(|row| filter.admits(&row.tenant_id));
        let (latest, superseded) = latest_rows(admitted);
        let filtered_out = rows.len() - latest.len() - superseded;

        if superseded > 0 {
            debug!(superseded, "Dropped older duplicate preference rows");
        }

        let run = || {
            latest
                .par_iter()
                .map(|row| resolve_enabled(row, regions))
                .fold(PreferenceResolution::default, PreferenceResolution::absorb)
                .reduce(PreferenceResolution::default, PreferenceResolution::merge)
        };

        let mut resolution = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };
        resolution.filtered_out = filtered_out;
        resolution.superseded = superseded;

        info!(
            rows = rows.len(),
            resolved = resolution.preferences.len(),
            malformed = resolution.errors.len(),
            disabled = resolution.skipped_disabled,
            filtered_out,
            "Resolved tenant archive preferences"
        );

        resolution
    }
}
