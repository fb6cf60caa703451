//! Time-windowed counting over record timestamps.
//!
//! Growth charts use cumulative buckets: each bucket counts every record
//! that existed at its boundary, not only those created inside it.

use chrono::{DateTime, Datelike as _, Months, NaiveDateTime, TimeDelta, Utc};
use kintr_analytics_models::{GrowthSeries, RecentAccounts, TimeSeriesPoint};
use thiserror::Error;

/// Timestamp layout written by the mobile clients.
const STORED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A timestamp string that matches none of the accepted layouts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized timestamp '{input}'")]
pub struct TimeParseError {
    /// The rejected input.
    pub input: String,
}

/// Parses a stored timestamp into an absolute instant.
///
/// Accepts `YYYY-MM-DD HH:MM:SS` (taken as UTC), `YYYY-MM-DDTHH:MM:SS`
/// with optional fractional seconds (UTC), and RFC 3339.
///
/// # Errors
///
/// Returns [`TimeParseError`] if no layout matches.
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, TimeParseError> {
    let s = s.trim();

    if let Ok(naive) = NaiveDateTime::parse_from_str(s, STORED_FORMAT) {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TimeParseError {
            input: s.to_string(),
        })
}

/// Parses every timestamp, dropping (and logging) the ones that fail.
pub fn parse_instants_lenient<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<DateTime<Utc>> {
    raw.into_iter()
        .filter_map(|s| {
            parse_instant(s)
                .map_err(|e| log::debug!("Skipping timestamp: {e}"))
                .ok()
        })
        .collect()
}

/// Bucket size and label style for [`bucket_counts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// Daily buckets labelled by weekday (`Mon`).
    Weekday,
    /// Daily buckets labelled by day and month (`07 Mar`).
    DayOfMonth,
    /// Calendar-month buckets (`Mar 2024`), stepped back 30 days at a time.
    Month,
}

/// Counts records into `window_length` buckets ending just before `now`,
/// oldest first.
///
/// Daily buckets sit at `now - i days` and count records strictly before
/// that boundary. Monthly buckets take the calendar month containing
/// `now - 30·i days` and count records up to the last day of that month
/// (at `now`'s time of day), inclusive. Every bucket is emitted, even with a
/// zero count.
#[must_use]
pub fn bucket_counts(
    records: &[DateTime<Utc>],
    now: DateTime<Utc>,
    granularity: Granularity,
    window_length: u32,
) -> Vec<TimeSeriesPoint> {
    (1..=window_length)
        .rev()
        .map(|i| {
            let i = i64::from(i);
            let (label, count) = match granularity {
                Granularity::Weekday | Granularity::DayOfMonth => {
                    let boundary = now - TimeDelta::days(i);
                    let format = if granularity == Granularity::Weekday {
                        "%a"
                    } else {
                        "%d %b"
                    };
                    let count = records.iter().filter(|r| **r < boundary).count();
                    (boundary.format(format).to_string(), count)
                }
                Granularity::Month => {
                    let anchor = now - TimeDelta::days(30 * i);
                    let end = end_of_month(anchor);
                    let count = records.iter().filter(|r| **r <= end).count();
                    (anchor.format("%b %Y").to_string(), count)
                }
            };
            TimeSeriesPoint {
                label,
                count: count as u64,
            }
        })
        .collect()
}

/// Last day of `anchor`'s month, keeping `anchor`'s time of day.
fn end_of_month(anchor: DateTime<Utc>) -> DateTime<Utc> {
    anchor
        .date_naive()
        .with_day(1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .map_or(anchor, |last| last.and_time(anchor.time()).and_utc())
}

/// Counts timestamps strictly after `now - window`.
#[must_use]
pub fn count_in_window(timestamps: &[DateTime<Utc>], now: DateTime<Utc>, window: TimeDelta) -> u64 {
    let start = now - window;
    timestamps.iter().filter(|t| **t > start).count() as u64
}

/// Growth buckets for the five dashboard chart windows.
#[must_use]
pub fn growth_series(records: &[DateTime<Utc>], now: DateTime<Utc>) -> GrowthSeries {
    GrowthSeries {
        last_week: bucket_counts(records, now, Granularity::Weekday, 7),
        last_month: bucket_counts(records, now, Granularity::DayOfMonth, 30),
        last_4_months: bucket_counts(records, now, Granularity::Month, 4),
        last_6_months: bucket_counts(records, now, Granularity::Month, 6),
        last_year: bucket_counts(records, now, Granularity::Month, 12),
    }
}

/// Accounts created in the last 12 and 4 hours, both measured from `now`.
#[must_use]
pub fn recent_accounts(created: &[DateTime<Utc>], now: DateTime<Utc>) -> RecentAccounts {
    RecentAccounts {
        recent_users_12h_count: count_in_window(created, now, TimeDelta::hours(12)),
        recent_users_4h_count: count_in_window(created, now, TimeDelta::hours(4)),
    }
}
