//! Lenient timestamp parsing for API payloads.
//!
//! The remote API emits several flavours of ISO-8601: RFC 3339 with an
//! offset, naive date-times with a trailing `Z` glued on, naive date-times
//! without any zone, and plain dates. All of them are read as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse an API timestamp into a UTC instant.
///
/// Returns `None` for empty or unparseable input.
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // "2025-06-25T10:00:00.123456" (optionally with a bare trailing Z)
    let naive = raw.trim_end_matches('Z');
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Parse an optional API timestamp.
pub fn parse_optional(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(parse_instant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parses_rfc3339_with_offset() {
        let dt = parse_instant("2025-06-25T12:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 25, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parses_naive_with_trailing_z() {
        let dt = parse_instant("2025-06-25T10:00:00.123456Z").unwrap();
        assert_eq!(dt.timestamp(), Utc.with_ymd_and_hms(2025, 6, 25, 10, 0, 0).unwrap().timestamp());

        let dt = parse_instant("2025-06-25T10:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 25, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parses_plain_date() {
        let dt = parse_instant("2025-06-25").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 6, 25, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_instant("").is_none());
        assert!(parse_instant("yesterday").is_none());
        assert!(parse_optional(None).is_none());
    }
}
