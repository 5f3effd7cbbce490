// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting and calendar-month windows.
//!
//! Transaction dates are stored as RFC3339 UTC strings with a `Z` suffix and
//! whole-second precision, so lexicographic comparison matches chronological
//! order and Firestore range filters work on plain strings.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// `YYYY-MM` key for a UTC timestamp.
pub fn month_key(date: DateTime<Utc>) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Extract `YYYY-MM` from an RFC3339 date string.
pub fn month_key_from_rfc3339(date: &str) -> Option<String> {
    // "2024-05-15T10:30:00Z" -> "2024-05"
    if date.len() >= 7 {
        Some(date[..7].to_string())
    } else {
        None
    }
}

/// UTC calendar-month window `[start, end)` for a `YYYY-MM` key, as RFC3339
/// strings comparable against stored transaction dates.
///
/// Returns `None` for malformed keys ("2024-5", "2024-13", "garbage").
pub fn month_bounds(month: &str) -> Option<(String, String)> {
    let (year_str, month_str) = month.split_once('-')?;
    if year_str.len() != 4 || month_str.len() != 2 {
        return None;
    }

    let year: i32 = year_str.parse().ok()?;
    let month_num: u32 = month_str.parse().ok()?;

    let start = NaiveDate::from_ymd_opt(year, month_num, 1)?;
    let end = if month_num == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month_num + 1, 1)?
    };

    Some((midnight_utc(start), midnight_utc(end)))
}

/// Midnight UTC for a calendar date, formatted like `format_utc_rfc3339`.
fn midnight_utc(date: NaiveDate) -> String {
    format!("{date}T00:00:00Z")
}
