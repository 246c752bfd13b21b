//! Where raw preference rows come from.
//!
//! The relational store that owns tenant preferences is an external
//! collaborator. A [`PreferenceSource`] yields its rows, or a
//! [`SourceError`](crate::error::SourceError) when the store as a whole is
//! unusable. That error fails the run; row-level payload problems do not.

mod ndjson;

use async_trait::async_trait;

use crate::error::SourceResult;
use crate::types::RawPreferenceRow;

pub use ndjson::{NdjsonPreferenceSource, parse_rows};

/// A provider of raw preference rows.
#[async_trait]
pub trait PreferenceSource: Send + Sync {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Fetches every tenant's preference row.
    async fn fetch_rows(&self) -> SourceResult<Vec<RawPreferenceRow>>;
}

/// Serves a fixed set of rows.
#[derive(Debug, Clone, Default)]
pub struct StaticPreferenceSource {
    rows: Vec<RawPreferenceRow>,
}

impl StaticPreferenceSource {
    /// Creates a source over the given rows.
    pub fn new(rows: Vec<RawPreferenceRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl PreferenceSource for StaticPreferenceSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch_rows(&self) -> SourceResult<Vec<RawPreferenceRow>> {
        Ok(self.rows.clone())
    }
}
