use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

pub const ONE_YEAR_MS: i64 = 365 * 24 * 60 * 60 * 1000;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a datetime field into epoch milliseconds.
///
/// Numbers are taken as epoch milliseconds. Strings may be RFC 3339, a naive
/// date-time or a bare date; naive forms are read as UTC. Anything else,
/// including an epoch outside chrono's date range, is not a date.
pub fn parse_datetime_ms(value: &Value) -> Option<i64> {
    let ms = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(f64_to_ms)),
        Value::String(s) => parse_datetime_str(s.trim()),
        _ => None,
    }?;
    DateTime::<Utc>::from_timestamp_millis(ms).map(|_| ms)
}

fn f64_to_ms(f: f64) -> Option<i64> {
    // `as` saturates, so out-of-range floats must be refused first.
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn parse_datetime_str(s: &str) -> Option<i64> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_epoch_number_passes_through() {
        assert_eq!(
            parse_datetime_ms(&json!(1_600_000_000_000i64)),
            Some(1_600_000_000_000)
        );
        assert_eq!(parse_datetime_ms(&json!(1.5e12)), Some(1_500_000_000_000));
    }

    #[test]
    fn test_string_forms() {
        let expected = 1_577_836_800_000; // 2020-01-01T00:00:00Z
        assert_eq!(parse_datetime_ms(&json!("2020-01-01T00:00:00Z")), Some(expected));
        assert_eq!(
            parse_datetime_ms(&json!("2020-01-01T02:00:00+02:00")),
            Some(expected)
        );
        assert_eq!(parse_datetime_ms(&json!("2020-01-01 00:00:00")), Some(expected));
        assert_eq!(parse_datetime_ms(&json!("2020-01-01")), Some(expected));
    }

    #[test]
    fn test_non_dates() {
        assert_eq!(parse_datetime_ms(&json!("not-a-date")), None);
        assert_eq!(parse_datetime_ms(&json!("")), None);
        assert_eq!(parse_datetime_ms(&json!(true)), None);
        assert_eq!(parse_datetime_ms(&Value::Null), None);
        assert_eq!(parse_datetime_ms(&json!(1e300)), None);
        assert_eq!(parse_datetime_ms(&json!(-1e300)), None);
        assert_eq!(parse_datetime_ms(&json!(i64::MAX)), None);
        assert_eq!(parse_datetime_ms(&json!(u64::MAX)), None);
    }
}
