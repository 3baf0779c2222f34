//! Date parsing and day bucketing.
//!
//! Record stores hand dates back as strings in a handful of shapes (plain
//! `YYYY-MM-DD`, RFC 3339, space-separated timestamps with or without an
//! offset). Everything is normalised to UTC; a value that matches none of the
//! accepted shapes is treated as absent.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a date string into a UTC instant.
///
/// Date-only values are taken as UTC midnight.
pub fn parse_date_str(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc());
        }
    }
    for fmt in NAIVE_DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }
    None
}

/// Parse a field value into a UTC instant. Only strings are considered dates.
pub fn parse_date_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Array(items) if items.len() == 1 => parse_date_value(&items[0]),
        _ => None,
    }
}

/// Calendar key (`YYYY-MM-DD`) for a UTC day.
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Short chart label for a day, e.g. `02 Jan`.
pub fn day_label(day: NaiveDate) -> String {
    day.format("%d %b").to_string()
}

/// The `horizon_days` consecutive UTC days ending with `today` (inclusive),
/// oldest first.
pub fn day_window(today: NaiveDate, horizon_days: u32) -> Vec<NaiveDate> {
    let horizon = i64::from(horizon_days);
    (0..horizon)
        .filter_map(|i| today.checked_sub_signed(Duration::days(horizon - 1 - i)))
        .collect()
}

/// Instant `days` days before `now`.
pub fn days_before(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days)
}

#[cfg(test)]
#[path = "time_tests.rs"]
mod tests;
