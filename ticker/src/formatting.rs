//! Display formatting for the ticker line.
//!
//! Pure functions: every age is computed against the `now` passed in.

use crate::models::Snapshot;
use chrono::{DateTime, Utc};
use num_format::{Locale, ToFormattedString};

/// Whole-dollar amount with thousands separators, sign in front of the `$`.
/// `-1234567.0` -> `-$1,234,567`
pub fn format_dollars(value: f64) -> String {
    // float-to-int casts saturate, NaN becomes 0
    let dollars = value.abs().round() as u64;
    let grouped = dollars.to_formatted_string(&Locale::en);
    if value < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// `800000` -> `800,000`
pub fn format_integer(value: u64) -> String {
    value.to_formatted_string(&Locale::en)
}

fn minutes_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = (now - then).num_milliseconds() as f64;
    format!("{:.0}", millis / 60_000.0)
}

fn seconds_since(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = (now - then).num_milliseconds() as f64;
    format!("{:.0}", millis / 1_000.0)
}

/// Render the one-line title for a snapshot.
///
/// Returns `None` when the snapshot carries neither price nor stats, in
/// which case the caller keeps whatever it displayed before.
pub fn render_title(snapshot: &Snapshot, now: DateTime<Utc>) -> Option<String> {
    let fetch_age = seconds_since(snapshot.fetched_at, now);

    match (&snapshot.price, &snapshot.stats) {
        (Some(price), Some(stats)) => Some(format!(
            "{} @ {} ({}m/{}s)",
            format_dollars(price.usd()),
            format_integer(stats.height),
            minutes_since(stats.observed_time, now),
            fetch_age,
        )),
        (Some(price), None) => Some(format!("{} ({}s)", format_dollars(price.usd()), fetch_age)),
        (None, Some(stats)) => Some(format!(
            "@ {} ({}m/{}s)",
            format_integer(stats.height),
            minutes_since(stats.observed_time, now),
            fetch_age,
        )),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BlockchainStats, PriceInfo};
    use chrono::Duration;
    use std::collections::HashMap;

    fn price(usd: f64) -> PriceInfo {
        PriceInfo {
            bitcoin: HashMap::from([("usd".to_string(), usd)]),
        }
    }

    fn stats(height: u64, observed_time: DateTime<Utc>) -> BlockchainStats {
        BlockchainStats {
            hash: "0000".to_string(),
            height,
            observed_time,
        }
    }

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(-1234567.0), "-$1,234,567");
        assert_eq!(format_dollars(42.9), "$43");
        assert_eq!(format_dollars(-123456.0), "-$123,456");
        assert_eq!(format_dollars(0.0), "$0");
        assert_eq!(format_dollars(999.4), "$999");
        assert_eq!(format_dollars(999.6), "$1,000");
        assert_eq!(format_dollars(1e30), format!("${}", u64::MAX.to_formatted_string(&Locale::en)));
    }

    #[test]
    fn test_format_integer() {
        assert_eq!(format_integer(800000), "800,000");
        assert_eq!(format_integer(0), "0");
        assert_eq!(format_integer(999), "999");
        assert_eq!(format_integer(1000), "1,000");
        assert_eq!(format_integer(12345678), "12,345,678");
    }

    #[test]
    fn test_render_full() {
        let now = Utc::now();
        let snapshot = Snapshot {
            fetched_at: now - Duration::seconds(12),
            stats: Some(stats(812345, now - Duration::minutes(7))),
            price: Some(price(43210.4)),
            error: None,
        };

        assert_eq!(
            render_title(&snapshot, now).as_deref(),
            Some("$43,210 @ 812,345 (7m/12s)")
        );
    }

    #[test]
    fn test_render_price_only_has_no_height_segment() {
        let now = Utc::now();
        let snapshot = Snapshot {
            fetched_at: now - Duration::seconds(3),
            stats: None,
            price: Some(price(43210.0)),
            error: None,
        };

        let title = render_title(&snapshot, now).unwrap();
        assert_eq!(title, "$43,210 (3s)");
        assert!(!title.contains('@'));
    }

    #[test]
    fn test_render_stats_only() {
        let now = Utc::now();
        let snapshot = Snapshot {
            fetched_at: now,
            stats: Some(stats(800000, now - Duration::seconds(170))),
            price: None,
            error: None,
        };

        assert_eq!(render_title(&snapshot, now).unwrap(), "@ 800,000 (3m/0s)");
    }

    #[test]
    fn test_render_nothing() {
        assert_eq!(render_title(&Snapshot::empty(Utc::now()), Utc::now()), None);
    }

    #[test]
    fn test_render_ages_advance_with_now() {
        let fetched = Utc::now();
        let snapshot = Snapshot {
            fetched_at: fetched,
            stats: None,
            price: Some(price(1.0)),
            error: None,
        };

        assert_eq!(render_title(&snapshot, fetched).unwrap(), "$1 (0s)");
        assert_eq!(
            render_title(&snapshot, fetched + Duration::seconds(41)).unwrap(),
            "$1 (41s)"
        );
    }
}
