//! Typed view of a tenant's preference payload.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::PayloadError;

/// Field holding the ordered archive formats.
pub const DATA_FORMAT_FIELD: &str = "data_format";

/// The parts of a preference payload that drive archiving.
///
/// Other fields in the payload are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ArchivePayload {
    /// Archive formats, in order.
    #[serde(default)]
    data_format: Option<Vec<String>>,

    /// Container used for every region without its own override.
    #[serde(default)]
    default_archive_container_url: Option<String>,

    /// Per-region container overrides. `null` values are treated as blank.
    #[serde(default)]
    archive_container_urls: Option<HashMap<String, Option<String>>>,
}

impl ArchivePayload {
    /// Archive formats, in payload order. Never empty for a parsed payload.
    pub fn formats(&self) -> &[String] {
        self.data_format.as_deref().unwrap_or_default()
    }

    /// The default container, exactly as given.
    pub fn default_container(&self) -> Option<&str> {
        self.default_archive_container_url.as_deref()
    }

    /// The per-region override map, if the payload has one.
    pub fn container_overrides(&self) -> Option<&HashMap<String, Option<String>>> {
        self.archive_container_urls.as_ref()
    }

    /// Consumes the payload, returning its formats.
    pub fn into_formats(self) -> Vec<String> {
        self.data_format.unwrap_or_default()
    }
}

/// Parses a preference payload.
///
/// Fails when the text is not JSON, when `data_format` is missing or not an
/// array of strings, or when it lists no formats.
///
/// ```
/// use tenant_archive::preferences::parse_payload;
///
/// let payload = parse_payload(r#"{
///     "data_format": ["JSON", "XML"],
///     "default_archive_container_url": "https://storage/c1"
/// }"#).unwrap();
///
/// assert_eq!(payload.formats(), ["JSON", "XML"]);
/// assert_eq!(payload.default_container(), Some("https://storage/c1"));
/// assert!(payload.container_overrides().is_none());
///
/// assert!(parse_payload("{}").is_err());
/// ```
pub fn parse_payload(text: &str) -> Result<ArchivePayload, PayloadError> {
    let payload: ArchivePayload = serde_json::from_str(text)?;

    match payload.data_format.as_ref().map(Vec::len) {
        None => Err(PayloadError::MissingField {
            field: DATA_FORMAT_FIELD.to_string(),
        }),
        Some(0) => Err(PayloadError::EmptyFormats {
            field: DATA_FORMAT_FIELD.to_string(),
        }),
        Some(_) => Ok(payload),
    }
}
