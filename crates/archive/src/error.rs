//! Error types for archive resolution.
//!
//! Errors are split by blast radius. [`TenantError`] covers failures that belong
//! to a single tenant and never stop a batch. [`ArchiveError`] covers faults that
//! make the whole run meaningless (an unreachable preference store, an invalid
//! run configuration).

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::tenant::TenantId;

/// The top-level, batch-fatal error type.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The preference source could not produce rows.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The run configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The preference worker pool could not be built.
    #[error("failed to build preference worker pool: {message}")]
    WorkerPool { message: String },

    /// The preference resolution task died before reporting.
    #[error("preference resolution task failed: {message}")]
    Resolution { message: String },
}

/// A failure scoped to one tenant.
///
/// These are collected next to the successful results of a phase and never
/// abort processing of other tenants.
#[derive(Error, Debug, Clone)]
pub enum TenantError {
    /// The tenant's preference payload could not be parsed.
    #[error("malformed preference payload for tenant {tenant_id}: {source}")]
    MalformedPayload {
        tenant_id: TenantId,
        #[source]
        source: PayloadError,
    },

    /// The tenant's admin principal could not be looked up.
    #[error("admin lookup failed for tenant {tenant_id}: {source}")]
    IdentityLookupFailure {
        tenant_id: TenantId,
        #[source]
        source: IdentityError,
    },

    /// An impersonation token could not be issued for the tenant's admin.
    #[error("impersonation failed for tenant {tenant_id}: {source}")]
    ImpersonationFailure {
        tenant_id: TenantId,
        #[source]
        source: IdentityError,
    },
}

impl TenantError {
    /// Returns the tenant this error belongs to.
    pub fn tenant_id(&self) -> &TenantId {
        match self {
            TenantError::MalformedPayload { tenant_id, .. }
            | TenantError::IdentityLookupFailure { tenant_id, .. }
            | TenantError::ImpersonationFailure { tenant_id, .. } => tenant_id,
        }
    }

    /// Returns the step that produced this error.
    pub fn stage(&self) -> FailureStage {
        match self {
            TenantError::MalformedPayload { .. } => FailureStage::Preferences,
            TenantError::IdentityLookupFailure { .. } => FailureStage::IdentityLookup,
            TenantError::ImpersonationFailure { .. } => FailureStage::Impersonation,
        }
    }

    /// Converts the error into a serializable record for reporting.
    pub fn to_record(&self) -> FailureRecord {
        let cause = match self {
            TenantError::MalformedPayload { source, .. } => source.to_string(),
            TenantError::IdentityLookupFailure { source, .. }
            | TenantError::ImpersonationFailure { source, .. } => source.to_string(),
        };
        FailureRecord {
            tenant_id: self.tenant_id().clone(),
            stage: self.stage(),
            cause,
        }
    }
}

/// The step of the run at which a tenant failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Payload parsing during preference resolution.
    Preferences,
    /// Admin principal lookup.
    IdentityLookup,
    /// Impersonation token issuance.
    Impersonation,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Preferences => write!(f, "preferences"),
            FailureStage::IdentityLookup => write!(f, "identity_lookup"),
            FailureStage::Impersonation => write!(f, "impersonation"),
        }
    }
}

/// Flattened, serializable form of a [`TenantError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// The failing tenant.
    pub tenant_id: TenantId,
    /// Where it failed.
    pub stage: FailureStage,
    /// Human-readable cause.
    pub cause: String,
}

/// Reasons a preference payload is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    /// The payload is not JSON, or a field has the wrong shape.
    #[error("invalid payload JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        message: String,
        line: usize,
        column: usize,
    },

    /// A required field is absent.
    #[error("missing required field: {field}")]
    MissingField { field: String },

    /// The payload lists no archive formats.
    #[error("field {field} must list at least one format")]
    EmptyFormats { field: String },
}

/// Failures reported by an identity service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// No admin principal is registered for the tenant.
    #[error("no admin principal found for tenant {tenant_id}")]
    AdminNotFound { tenant_id: TenantId },

    /// The service refused the request.
    #[error("request rejected: {message}")]
    Rejected { message: String },

    /// The service could not be reached.
    #[error("identity service unavailable: {message}")]
    Unavailable { message: String },

    /// Anything else, including a crashed worker task.
    #[error("internal identity error: {message}")]
    Internal { message: String },
}

/// Batch-fatal errors from a preference source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The backing store is unreachable.
    #[error("preference source {source_name} unavailable: {message}")]
    Unavailable {
        source_name: String,
        message: String,
    },

    /// A row did not match the fixed row shape.
    #[error("invalid preference row at line {line}: {message}")]
    InvalidRow { line: u64, message: String },

    /// Reading the backing file failed.
    #[error("failed to read preference rows: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in a run configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No regions were requested.
    #[error("at least one region must be requested")]
    NoRegions,

    /// A region name is empty or whitespace.
    #[error("region at position {index} is blank")]
    BlankRegion { index: usize },

    /// A region was requested twice.
    #[error("region {region} is requested more than once")]
    DuplicateRegion { region: String },
}

/// Result type alias for batch-level operations.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Result type alias for preference source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type alias for identity service calls.
pub type IdentityResult<T> = Result<T, IdentityError>;

impl From<serde_json::Error> for PayloadError {
    fn from(err: serde_json::Error) -> Self {
        PayloadError::InvalidJson {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

impl From<rayon::ThreadPoolBuildError> for ArchiveError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        ArchiveError::WorkerPool {
            message: err.to_string(),
        }
    }
}
