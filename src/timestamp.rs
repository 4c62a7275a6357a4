use chrono::NaiveDateTime;
use std::fmt;

/// Textual layout for assignment start/end fields, e.g. `2024-01-05 5:00 PM`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %-I:%M %p";

// The parser accepts both `5:00 PM` and `05:00 pm`.
const PARSE_FORMAT: &str = "%Y-%m-%d %I:%M %p";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampError {
    input: String,
}

impl TimestampError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid date time format '{}' (expected YYYY-MM-DD h:mm AM/PM)",
            self.input
        )
    }
}

impl std::error::Error for TimestampError {}

pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, TimestampError> {
    NaiveDateTime::parse_from_str(input.trim(), PARSE_FORMAT).map_err(|_| TimestampError {
        input: input.to_string(),
    })
}

pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}
