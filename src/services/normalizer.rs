//! Date normalization for extracted rows.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Datetime formats, tried in order.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Date-only formats, tried after the datetime formats.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a date cell into a UTC timestamp.
///
/// The whole trimmed text must match one of the formats; the first match wins.
/// Dates without a time are placed at midnight. No timezone conversion is done,
/// the page is taken to be in UTC already.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}
