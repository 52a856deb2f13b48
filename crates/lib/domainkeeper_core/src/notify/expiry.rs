//! Pure expiry-date evaluation.

use chrono::NaiveDate;

/// Day-count boundaries that trigger a notification.
pub const EXPIRY_THRESHOLDS: [i64; 5] = [30, 14, 7, 3, 1];

/// Signed whole days from `today` until `expiry`. Negative once expired —
/// never clamped, so overdue resources stay representable.
pub fn days_until(expiry: NaiveDate, today: NaiveDate) -> i64 {
    expiry.signed_duration_since(today).num_days()
}

/// Exact boundary match, not `<=`: a resource is notified only on the day it
/// crosses each threshold, bounding the volume to one email per boundary.
pub fn matches_threshold(days: i64) -> bool {
    EXPIRY_THRESHOLDS.contains(&days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn forty_five_days_out() {
        assert_eq!(days_until(date(2026, 9, 20), date(2026, 8, 6)), 45);
    }

    #[test]
    fn same_day_is_zero() {
        assert_eq!(days_until(date(2026, 8, 6), date(2026, 8, 6)), 0);
    }

    #[test]
    fn overdue_goes_negative() {
        assert_eq!(days_until(date(2026, 8, 1), date(2026, 8, 6)), -5);
    }

    #[test]
    fn crosses_month_boundaries() {
        assert_eq!(days_until(date(2027, 1, 5), date(2026, 12, 29)), 7);
    }

    #[test]
    fn threshold_is_exact_equality() {
        assert!(matches_threshold(30));
        assert!(!matches_threshold(29));
        assert!(!matches_threshold(31));
        assert!(matches_threshold(1));
        assert!(!matches_threshold(0));
        assert!(!matches_threshold(-1));
    }

    #[test]
    fn every_configured_threshold_matches() {
        for days in EXPIRY_THRESHOLDS {
            assert!(matches_threshold(days));
        }
    }
}
