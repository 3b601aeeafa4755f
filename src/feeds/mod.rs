pub mod types;
pub mod nvd;
pub mod kev;

pub use kev::KevClient;
pub use nvd::NvdClient;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Parse the timestamp shapes the feeds emit: ISO-8601 with millisecond
/// precision and no timezone suffix (NVD), RFC 3339, or a bare date (KEV).
pub fn parse_feed_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.3f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nvd_millisecond_timestamp() {
        let dt = parse_feed_timestamp("2024-01-15T10:30:00.000").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_rfc3339() {
        assert!(parse_feed_timestamp("2024-01-15T10:30:00Z").is_some());
    }

    #[test]
    fn test_parse_kev_bare_date() {
        let dt = parse_feed_timestamp("2024-03-01").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_garbage_returns_none() {
        assert!(parse_feed_timestamp("yesterday").is_none());
        assert!(parse_feed_timestamp("").is_none());
    }
}
