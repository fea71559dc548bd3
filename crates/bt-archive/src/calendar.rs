//! Canonical string forms for calendar values.
//!
//! Archives never encode dates natively; timestamps and days travel through
//! the nullable-string codec in the forms defined here.

use chrono::{NaiveDate, NaiveDateTime, ParseError};

/// Timestamp format: ISO-8601 local date-time, fractional seconds only when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Calendar day format: ISO-8601 date.
pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Format a timestamp in its canonical form.
#[must_use]
pub fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp from its canonical form.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
}

/// Format a calendar day in its canonical form.
#[must_use]
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a calendar day from its canonical form.
pub fn parse_day(text: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(text, DAY_FORMAT)
}
