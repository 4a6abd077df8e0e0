//! Custom parsing helpers for backend wire formats.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Offset-carrying layouts RFC 3339 parsing rejects (`+hhmm`, space separator).
const OFFSET_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Naive layouts the REST store emits once the UTC offset has been dropped.
const NAIVE_LAYOUTS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses an ISO-8601 timestamp into UTC.
///
/// Offset-carrying forms (`Z`, `+hh:mm`, `+hhmm`) are converted to UTC;
/// offset-less forms are taken to already be UTC. A bare date (`2024-05-01`)
/// is midnight UTC.
pub fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = OFFSET_LAYOUTS
        .iter()
        .find_map(|layout| DateTime::parse_from_str(raw, layout).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(raw, layout).ok())
    {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
