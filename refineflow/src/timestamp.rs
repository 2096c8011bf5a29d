//! Timestamp helpers. Stored timestamps are RFC 3339 in UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Render a stored timestamp for humans, e.g. `2024-01-15 10:30:00 UTC`.
///
/// Timestamps without an offset are taken as UTC; anything unparseable is
/// returned untouched.
pub fn format(ts: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(ts) {
        return parsed
            .with_timezone(&Utc)
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string();
    }
    match NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.and_utc().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        Err(_) => ts.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_parseable_utc() {
        let ts = now();
        let parsed = DateTime::parse_from_rfc3339(&ts).unwrap();
        assert_eq!(parsed.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_format_rfc3339() {
        assert_eq!(format("2024-01-15T10:30:00+00:00"), "2024-01-15 10:30:00 UTC");
        assert_eq!(format("2024-01-15T12:30:00+02:00"), "2024-01-15 10:30:00 UTC");
    }

    #[test]
    fn test_format_naive_timestamp() {
        assert_eq!(format("2024-01-01T00:00:00"), "2024-01-01 00:00:00 UTC");
        assert_eq!(format("2024-01-01T00:00:00.123456"), "2024-01-01 00:00:00 UTC");
    }

    #[test]
    fn test_format_invalid_returns_input() {
        assert_eq!(format("not a date"), "not a date");
        assert_eq!(format(""), "");
    }
}
