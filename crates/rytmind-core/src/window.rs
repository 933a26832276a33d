//! Analysis window calculations
//!
//! Every function takes an explicit `now` so window math stays pure and
//! deterministic in tests; callers at the edges supply the wall clock.

use chrono::{DateTime, Datelike, NaiveDate, Utc};

use crate::models::PeriodType;

/// Milliseconds in a day
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Length of the historical pattern window
pub const HISTORY_DAYS: i64 = 90;

/// Assumed month count for the history window (90 days = ~3 months)
pub const HISTORY_MONTHS: f64 = 3.0;

/// Unix milliseconds for an instant
pub fn to_millis(t: DateTime<Utc>) -> i64 {
    t.timestamp_millis()
}

/// Start of the calendar month containing `now`, in unix milliseconds
pub fn month_start_millis(now: DateTime<Utc>) -> i64 {
    // Day 1 of a valid year/month is always constructible
    NaiveDate::from_ymd_opt(now.year(), now.month(), 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
        .timestamp_millis()
}

/// (start, end) range in unix milliseconds for an analysis period
pub fn period_range_millis(period: PeriodType, now: DateTime<Utc>) -> (i64, i64) {
    let end = to_millis(now);
    (end - period.days() * DAY_MS, end)
}

/// (start, end) range in unix milliseconds for the 90-day history window
pub fn history_range_millis(now: DateTime<Utc>) -> (i64, i64) {
    let end = to_millis(now);
    (end - HISTORY_DAYS * DAY_MS, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_month_start() {
        let now = Utc.with_ymd_and_hms(2024, 12, 6, 10, 30, 0).unwrap();
        let start = month_start_millis(now);
        let expected = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
        assert_eq!(start, expected.timestamp_millis());
    }

    #[test]
    fn test_period_range_lengths() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        for (period, days) in [
            (PeriodType::SevenDays, 7),
            (PeriodType::FourteenDays, 14),
            (PeriodType::ThirtyDays, 30),
        ] {
            let (start, end) = period_range_millis(period, now);
            assert_eq!(end - start, days * DAY_MS);
            assert_eq!(end, now.timestamp_millis());
        }
    }

    #[test]
    fn test_history_range() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let (start, end) = history_range_millis(now);
        assert_eq!(end - start, HISTORY_DAYS * DAY_MS);
    }
}
