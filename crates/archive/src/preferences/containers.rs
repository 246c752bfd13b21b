//! Region to container resolution.
//!
//! A tenant's destination for a region is picked in this order:
//!
//! 1. A non-blank per-region override.
//! 2. The non-blank default container.
//! 3. Nothing: the region is left out and receives no archive.
//!
//! The default only exists as a fallback when it is non-blank. With no usable
//! default and no override map at all the result is empty.

use std::collections::{BTreeMap, HashMap};

/// Returns `true` for a missing, empty or whitespace-only value.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    if is_blank(value) { None } else { value }
}

fn override_for<'a>(
    overrides: Option<&'a HashMap<String, Option<String>>>,
    region: &str,
) -> Option<&'a str> {
    overrides
        .and_then(|map| map.get(region))
        .and_then(|value| non_blank(value.as_deref()))
}

/// Resolves one container per requested region.
///
/// The returned map only ever has keys taken from `regions`. Values are
/// returned as given, untrimmed.
///
/// ```
/// use std::collections::HashMap;
/// use tenant_archive::preferences::resolve_containers;
///
/// let regions = vec!["DFW".to_string(), "ORD".to_string()];
/// let overrides = HashMap::from([("DFW".to_string(), Some("C2".to_string()))]);
///
/// let containers = resolve_containers(&regions, Some("C1"), Some(&overrides));
/// assert_eq!(containers.get("DFW").map(String::as_str), Some("C2"));
/// assert_eq!(containers.get("ORD").map(String::as_str), Some("C1"));
/// ```
pub fn resolve_containers(
    regions: &[String],
    default_container: Option<&str>,
    overrides: Option<&HashMap<String, Option<String>>>,
) -> BTreeMap<String, String> {
    match (non_blank(default_container), overrides) {
        (Some(default), _) => regions
            .iter()
            .map(|region| {
                let container = override_for(overrides, region).unwrap_or(default);
                (region.clone(), container.to_string())
            })
            .collect(),
        (None, None) => BTreeMap::new(),
        (None, Some(_)) => regions
            .iter()
            .filter_map(|region| {
                override_for(overrides, region)
                    .map(|container| (region.clone(), container.to_string()))
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regions(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn overrides(entries: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    fn resolved(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(None));
        assert!(is_blank(Some("")));
        assert!(is_blank(Some(" \t\n")));
        assert!(!is_blank(Some(" c ")));
    }

    #[test]
    fn test_default_without_overrides_covers_every_region() {
        let result = resolve_containers(&regions(&["DFW", "ORD", "IAD"]), Some("C1"), None);
        assert_eq!(
            result,
            resolved(&[("DFW", "C1"), ("ORD", "C1"), ("IAD", "C1")])
        );
    }

    #[test]
    fn test_default_with_partial_overrides() {
        let map = overrides(&[("DFW", Some("C2"))]);
        let result = resolve_containers(&regions(&["DFW", "ORD"]), Some("C1"), Some(&map));
        assert_eq!(result, resolved(&[("DFW", "C2"), ("ORD", "C1")]));
    }

    #[test]
    fn test_blank_override_falls_back_to_default() {
        let map = overrides(&[("DFW", Some("  ")), ("ORD", None)]);
        let result = resolve_containers(&regions(&["DFW", "ORD"]), Some("C1"), Some(&map));
        assert_eq!(result, resolved(&[("DFW", "C1"), ("ORD", "C1")]));
    }

    #[test]
    fn test_no_default_no_overrides_is_empty() {
        assert!(resolve_containers(&regions(&["DFW", "ORD"]), None, None).is_empty());
    }

    #[test]
    fn test_blank_default_is_treated_as_missing() {
        assert!(resolve_containers(&regions(&["DFW"]), Some(" "), None).is_empty());

        let map = overrides(&[("ORD", Some("C3"))]);
        let result = resolve_containers(&regions(&["DFW", "ORD"]), Some(""), Some(&map));
        assert_eq!(result, resolved(&[("ORD", "C3")]));
    }

    #[test]
    fn test_overrides_only_omit_blank_and_missing_regions() {
        let map = overrides(&[("DFW", Some("C2")), ("ORD", Some(""))]);
        let result = resolve_containers(&regions(&["DFW", "ORD"]), None, Some(&map));
        assert_eq!(result, resolved(&[("DFW", "C2")]));
    }

    #[test]
    fn test_unrequested_override_regions_are_ignored() {
        let map = overrides(&[("LON", Some("C9")), ("DFW", Some("C2"))]);

        let result = resolve_containers(&regions(&["DFW"]), None, Some(&map));
        assert_eq!(result, resolved(&[("DFW", "C2")]));

        let result = resolve_containers(&regions(&["DFW"]), Some("C1"), Some(&map));
        assert_eq!(result, resolved(&[("DFW", "C2")]));
    }

    #[test]
    fn test_empty_override_map_without_default_is_empty() {
        let map = overrides(&[]);
        assert!(resolve_containers(&regions(&["DFW"]), None, Some(&map)).is_empty());
    }

    #[test]
    fn test_no_regions_requested() {
        assert!(resolve_containers(&[], Some("C1"), None).is_empty());
    }

    #[test]
    fn test_values_are_not_trimmed() {
        let result = resolve_containers(&regions(&["DFW"]), Some(" C1 "), None);
        assert_eq!(result, resolved(&[("DFW", " C1 ")]));
    }
}
