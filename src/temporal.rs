//! ISO-8601 date and date-time parsing for `date` and `datetime` elements.

use chrono::{DateTime, FixedOffset, NaiveDate};

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if text.len() != DATE_LEN || !has_date_shape(text) {
        return None;
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

const DATE_LEN: usize = "YYYY-MM-DD".len();

/// Checks that `text` starts with four, two and two ASCII digits separated by
/// dashes. chrono alone also takes signed years and single-digit fields.
fn has_date_shape(text: &str) -> bool {
    match text.as_bytes().get(..DATE_LEN) {
        Some(date) => date.iter().enumerate().all(|(i, &b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        }),
        None => false,
    }
}

/// Parses an ISO-8601 date-time with a `Z` designator or numeric offset.
///
/// RFC 3339 forms (`2024-01-15T10:30:00Z`, `2024-01-15T10:30:00.250+02:00`)
/// are accepted, as is the compact offset form `+0200`.
pub fn parse_datetime(text: &str) -> Option<DateTime<FixedOffset>> {
    if !has_date_shape(text) {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .or_else(|_| DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
}
