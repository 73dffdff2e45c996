//! Utility functions for tripcheck

use crate::constants::{DATE_FORMAT, SUBMITTED_AT_FORMAT};
use chrono::{DateTime, NaiveDate, TimeZone};

/// True when the string is empty or whitespace only
#[must_use]
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Parse a date string in YYYY-MM-DD format
///
/// # Errors
/// Returns `chrono::ParseError` if the date string is not in the expected format
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, DATE_FORMAT)
}

/// Format a moment as a `submittedAt` stamp, e.g. `02:30:15 pm`
#[must_use]
pub fn format_submitted_at<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(SUBMITTED_AT_FORMAT).to_string()
}

/// Display label of a day group at a zero-based position
#[must_use]
pub fn day_label(index: usize) -> String {
    format!("Day {}", index + 1)
}

/// Truncate a string to a maximum number of characters
#[must_use]
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
