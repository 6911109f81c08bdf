//! Date handling for business records.
//!
//! Business timestamps are naive wall-clock times in the dealership's zone
//! (IST, UTC+05:30). Clients send and receive them in a few fixed textual
//! formats, collected here together with serde helpers for each one.

use chrono::{Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::ValidationError;

/// `10:00 AM, September 30, 2024`
pub const DISPLAY_FORMAT: &str = "%I:%M %p, %B %d, %Y";

/// `2024-09-30 10:00:00`
pub const INPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `2024-09-30`
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// `September 30, 2024`
pub const DUE_DATE_FORMAT: &str = "%B %d, %Y";

const BUSINESS_UTC_OFFSET_SECS: i64 = 5 * 3600 + 30 * 60;

/// Current wall-clock time in the business time zone.
pub fn business_now() -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::seconds(BUSINESS_UTC_OFFSET_SECS)
}

pub fn format_display(value: &NaiveDateTime) -> String {
    value.format(DISPLAY_FORMAT).to_string()
}

pub fn format_due_date(value: &NaiveDate) -> String {
    value.format(DUE_DATE_FORMAT).to_string()
}

pub fn parse_display_datetime(value: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(value.trim(), DISPLAY_FORMAT).map_err(|_| {
        ValidationError::InvalidDate(format!(
            "Invalid date format: {value}. Expected format: '10:00 AM, September 30, 2024'"
        ))
    })
}

pub fn parse_input_datetime(value: &str) -> Result<NaiveDateTime, ValidationError> {
    NaiveDateTime::parse_from_str(value.trim(), INPUT_DATETIME_FORMAT).map_err(|_| {
        ValidationError::InvalidDate(format!(
            "Invalid date format: {value}. Expected format: 'YYYY-MM-DD HH:MM:SS'"
        ))
    })
}

pub fn parse_input_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), INPUT_DATE_FORMAT).map_err(|_| {
        ValidationError::InvalidDate(format!(
            "Invalid date format: {value}. Expected format: 'YYYY-MM-DD'"
        ))
    })
}

/// Serializes a timestamp in [`DISPLAY_FORMAT`].
pub mod display {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(super::DISPLAY_FORMAT))
    }
}

pub mod display_opt {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => s.collect_str(&value.format(super::DISPLAY_FORMAT)),
            None => s.serialize_none(),
        }
    }
}

/// Serializes a date in [`DUE_DATE_FORMAT`].
pub mod due_date {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&value.format(super::DUE_DATE_FORMAT))
    }
}
