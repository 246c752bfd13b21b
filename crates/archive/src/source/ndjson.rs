//! Newline-delimited JSON export of the preference table.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{SourceError, SourceResult};
use crate::types::RawPreferenceRow;

use super::PreferenceSource;

/// Reads rows from an NDJSON file, one [`RawPreferenceRow`] per line.
///
/// Blank lines are ignored. A line that does not decode as a row fails the
/// whole fetch, since it means the export itself is broken.
#[derive(Debug, Clone)]
pub struct NdjsonPreferenceSource {
    path: PathBuf,
}

impl NdjsonPreferenceSource {
    /// Creates a source reading from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Parses NDJSON text into rows.
pub fn parse_rows(text: &str) -> SourceResult<Vec<RawPreferenceRow>> {
    let mut rows = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let row: RawPreferenceRow =
            serde_json::from_str(line).map_err(|e| SourceError::InvalidRow {
                line: index as u64 + 1,
                message: e.to_string(),
            })?;
        rows.push(row);
    }

    Ok(rows)
}

#[async_trait]
impl PreferenceSource for NdjsonPreferenceSource {
    fn name(&self) -> &str {
        "ndjson"
    }

    async fn fetch_rows(&self) -> SourceResult<Vec<RawPreferenceRow>> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let rows = parse_rows(&text)?;
        debug!(path = %self.path.display(), rows = rows.len(), "Loaded preference rows");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const ROW_T1: &str = r#"{"tenant_id":"t1","payload":"{\"data_format\":[\"JSON\"]}","alternate_id":"A1","created":"2024-01-01T00:00:00Z","updated":"2024-01-01T00:00:00Z","enabled":true}"#;
    const ROW_T2: &str = r#"{"tenant_id":"t2","payload":"not json","created":"2024-01-01T00:00:00Z","updated":"2024-01-01T00:00:00Z","enabled":false}"#;

    #[test]
    fn test_parse_rows_skips_blank_lines() {
        let text = format!("{}\n\n  \n{}\n", ROW_T1, ROW_T2);
        let rows = parse_rows(&text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].alternate_id.as_deref(), Some("A1"));
        assert!(!rows[1].enabled);
    }

    #[test]
    fn test_parse_rows_reports_line() {
        let text = format!("{}\n{{\"tenant_id\": \"t3\"}}\n", ROW_T1);
        let err = parse_rows(&text).unwrap_err();
        assert!(matches!(err, SourceError::InvalidRow { line: 2, .. }));
    }

    #[tokio::test]
    async fn test_fetch_rows_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", ROW_T1).unwrap();
        writeln!(file, "{}", ROW_T2).unwrap();

        let source = NdjsonPreferenceSource::new(file.path());
        let rows = source.fetch_rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.name(), "ndjson");
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = NdjsonPreferenceSource::new(dir.path().join("absent.ndjson"));
        let err = source.fetch_rows().await.unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
