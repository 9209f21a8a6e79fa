//! Time frame reference tables.
//!
//! Market-file periods (one hour and up) are scanned before daily-file
//! periods (sub-hour, stored in per-day files). Each period has a canonical
//! label plus short aliases.

pub const MINUTE_MS: u64 = 60 * 1000;
pub const HOUR_MS: u64 = 60 * MINUTE_MS;

#[derive(Debug, Clone, Copy)]
pub struct Period {
    pub value: u64,
    pub labels: &'static [&'static str],
}

impl Period {
    const fn new(value: u64, labels: &'static [&'static str]) -> Self {
        Self { value, labels }
    }
}

pub const MARKET_FILES_PERIODS: &[Period] = &[
    Period::new(24 * HOUR_MS, &["24-hs", "24h", "1d"]),
    Period::new(12 * HOUR_MS, &["12-hs", "12h"]),
    Period::new(8 * HOUR_MS, &["08-hs", "8h"]),
    Period::new(6 * HOUR_MS, &["06-hs", "6h"]),
    Period::new(4 * HOUR_MS, &["04-hs", "4h"]),
    Period::new(3 * HOUR_MS, &["03-hs", "3h"]),
    Period::new(2 * HOUR_MS, &["02-hs", "2h"]),
    Period::new(HOUR_MS, &["01-hs", "1h"]),
];

pub const DAILY_FILES_PERIODS: &[Period] = &[
    Period::new(45 * MINUTE_MS, &["45-min", "45m"]),
    Period::new(40 * MINUTE_MS, &["40-min", "40m"]),
    Period::new(30 * MINUTE_MS, &["30-min", "30m"]),
    Period::new(20 * MINUTE_MS, &["20-min", "20m"]),
    Period::new(15 * MINUTE_MS, &["15-min", "15m"]),
    Period::new(10 * MINUTE_MS, &["10-min", "10m"]),
    Period::new(5 * MINUTE_MS, &["05-min", "5m"]),
    Period::new(4 * MINUTE_MS, &["04-min", "4m"]),
    Period::new(3 * MINUTE_MS, &["03-min", "3m"]),
    Period::new(2 * MINUTE_MS, &["02-min", "2m"]),
    Period::new(MINUTE_MS, &["01-min", "1m"]),
];

/// First matching period value across both tables, in table order.
pub fn resolve_label(label: &str) -> Option<u64> {
    MARKET_FILES_PERIODS
        .iter()
        .chain(DAILY_FILES_PERIODS)
        .find(|p| p.labels.contains(&label))
        .map(|p| p.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_hourly_labels() {
        assert_eq!(resolve_label("1h"), Some(3_600_000));
        assert_eq!(resolve_label("01-hs"), Some(3_600_000));
        assert_eq!(resolve_label("24-hs"), Some(86_400_000));
    }

    #[test]
    fn test_resolve_minute_labels() {
        assert_eq!(resolve_label("05-min"), Some(300_000));
        assert_eq!(resolve_label("1m"), Some(60_000));
    }

    #[test]
    fn test_unknown_label_is_none() {
        assert_eq!(resolve_label("bogus"), None);
        assert_eq!(resolve_label(""), None);
    }

    #[test]
    fn test_labels_are_unique() {
        let mut all: Vec<&str> = MARKET_FILES_PERIODS
            .iter()
            .chain(DAILY_FILES_PERIODS)
            .flat_map(|p| p.labels.iter().copied())
            .collect();
        let total = all.len();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }
}
