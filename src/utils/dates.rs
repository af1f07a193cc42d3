// src/utils/dates.rs

//! Date parsing and formatting for fetch windows.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{AppError, Result};

/// Format used in `ValoresGrafico/{code}/{instant}` URLs.
pub const WINDOW_FORMAT: &str = "%Y%m%d%H%M";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%d%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%d/%m/%Y"];

/// Render a window instant the way the upstream API expects it.
pub fn format_window(instant: NaiveDateTime) -> String {
    instant.format(WINDOW_FORMAT).to_string()
}

/// Parse a date or date-time argument; bare dates mean midnight.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    let trimmed = input.trim();

    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(parsed);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .ok_or_else(|| AppError::invalid_date(trimmed, "midnight out of range"));
        }
    }

    Err(AppError::invalid_date(
        trimmed,
        "expected YYYY-MM-DD, YYYY-MM-DDTHH:MM[:SS], YYYYMMDD or YYYYMMDDHHMM",
    ))
}

/// Instant `days` days before `now`.
pub fn days_before(now: NaiveDateTime, days: u32) -> NaiveDateTime {
    now - Duration::days(i64::from(days))
}
