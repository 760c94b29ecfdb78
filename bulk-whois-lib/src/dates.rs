//! Canonical date parsing for heterogeneous registry responses.
//!
//! Registries disagree about everything: RDAP sends RFC-3339 timestamps,
//! paid APIs send bare dates or epoch-ish strings, and legacy WHOIS servers
//! send whatever their operators typed in 1997. Some fields also arrive as a
//! list of candidate dates instead of a single value. Everything funnels
//! through here and comes out as `YYYY-MM-DD` or a best-effort truncation.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

/// Datetime formats seen in registry data, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%d-%b-%Y %H:%M:%S",
];

/// Date-only formats seen in registry data, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Normalize a single raw date string to canonical `YYYY-MM-DD`.
///
/// Returns `None` for empty/whitespace input. A value no format matches is
/// truncated to its first 10 characters as a best-effort fallback, so this
/// function never fails on non-empty input.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // RFC-3339 covers the usual RDAP shape, including `Z` and offsets
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive().format("%Y-%m-%d").to_string());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date().format("%Y-%m-%d").to_string());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }

    // Unparseable: keep the leading date-sized chunk rather than dropping data
    Some(raw.chars().take(10).collect())
}

/// A date field as it appears on the wire: either one value or a list of
/// candidate values (some registries report multiple creation dates).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DateField {
    /// A single date value; `null` deserializes as `One(None)`
    One(Option<String>),
    /// A sequence of candidate dates, possibly containing nulls
    Many(Vec<Option<String>>),
}

impl DateField {
    /// Resolve the field to a canonical date string.
    ///
    /// For a sequence, the first non-null, non-empty element wins and is
    /// normalized; trailing candidates are ignored.
    pub fn normalized(&self) -> Option<String> {
        match self {
            DateField::One(value) => value.as_deref().and_then(normalize_date),
            DateField::Many(values) => values
                .iter()
                .flatten()
                .find(|v| !v.trim().is_empty())
                .and_then(|v| normalize_date(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_rfc3339() {
        assert_eq!(
            normalize_date("2024-03-15T00:00:00Z"),
            Some("2024-03-15".to_string())
        );
        assert_eq!(
            normalize_date("1995-08-14T04:00:00+02:00"),
            Some("1995-08-14".to_string())
        );
    }

    #[test]
    fn test_normalize_naive_formats() {
        assert_eq!(
            normalize_date("2023-01-01 12:30:00"),
            Some("2023-01-01".to_string())
        );
        assert_eq!(normalize_date("2023-01-01"), Some("2023-01-01".to_string()));
        assert_eq!(normalize_date("14-aug-1995"), Some("1995-08-14".to_string()));
    }

    #[test]
    fn test_normalize_empty_is_none() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("   "), None);
    }

    #[test]
    fn test_normalize_unparseable_truncates() {
        assert_eq!(
            normalize_date("not-a-date-at-all"),
            Some("not-a-date".to_string())
        );
        // Short garbage passes through untouched
        assert_eq!(normalize_date("soon"), Some("soon".to_string()));
    }

    #[test]
    fn test_field_sequence_of_empties_is_none() {
        let field: DateField = serde_json::from_value(json!(["", null])).unwrap();
        assert_eq!(field.normalized(), None);
    }

    #[test]
    fn test_field_sequence_first_candidate_wins() {
        let field: DateField =
            serde_json::from_value(json!(["2023-01-01T00:00:00", null, "2020-05-05"])).unwrap();
        assert_eq!(field.normalized(), Some("2023-01-01".to_string()));

        // Leading nulls and empties are skipped
        let field: DateField =
            serde_json::from_value(json!([null, "", "2023-01-01"])).unwrap();
        assert_eq!(field.normalized(), Some("2023-01-01".to_string()));
    }

    #[test]
    fn test_field_single_value() {
        let field: DateField = serde_json::from_value(json!("2024-03-15T00:00:00Z")).unwrap();
        assert_eq!(field.normalized(), Some("2024-03-15".to_string()));

        let field: DateField = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(field.normalized(), None);
    }
}
