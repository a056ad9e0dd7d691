//! Calendar and timestamp utilities
//!
//! All timestamps are local naive date-times. They are persisted as fixed-width
//! text (`YYYY-MM-DDTHH:MM:SS.mmm`) so that string comparison in SQL matches
//! chronological order.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::{Error, Result};

/// Storage and wire format for timestamps
pub const STAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Storage and wire format for calendar dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const NAIVE_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Current local time
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Current local calendar day
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a caller-supplied date.
///
/// Accepts `YYYY-MM-DD` (local midnight), naive `YYYY-MM-DDTHH:MM[:SS[.fff]]`
/// and RFC 3339 with an offset (converted to local time).
pub fn parse_date_input(input: &str) -> Result<NaiveDateTime> {
    let s = input.trim();
    if s.is_empty() {
        return Err(Error::InvalidInput("Date is required".to_string()));
    }

    if let Ok(day) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(start_of_day(day));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }

    NAIVE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::InvalidInput(format!("Invalid date format: {}", input)))
}

/// Parse a caller-supplied date and keep only its calendar day
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    parse_date_input(input).map(|dt| dt.date())
}

/// `00:00:00.000` of the given day
pub fn start_of_day(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// `23:59:59.999` of the given day
pub fn end_of_day(day: NaiveDate) -> NaiveDateTime {
    start_of_day(day) + Duration::days(1) - Duration::milliseconds(1)
}

/// Inclusive window covering `days` whole days before `end_day` through the end of `end_day`
pub fn window_ending(end_day: NaiveDate, days: i64) -> (NaiveDateTime, NaiveDateTime) {
    let start_day = end_day - Duration::days(days);
    (start_of_day(start_day), end_of_day(end_day))
}

/// Render a timestamp in storage format
pub fn format_stamp(dt: &NaiveDateTime) -> String {
    dt.format(STAMP_FORMAT).to_string()
}

/// Decode a stored timestamp
pub fn parse_stamp(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, STAMP_FORMAT)
        .map_err(|e| Error::Internal(format!("Corrupt stored timestamp '{}': {}", s, e)))
}

/// Decode a stored calendar date
pub fn parse_stored_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| Error::Internal(format!("Corrupt stored date '{}': {}", s, e)))
}

/// Serde helper rendering a timestamp in storage format
pub mod stamp {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_stamp(dt))
    }
}

/// Serde helper rendering an optional calendar date as `YYYY-MM-DD`
pub mod optional_day {
    use chrono::NaiveDate;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        day: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match day {
            Some(d) => serializer.serialize_str(&d.format(super::DATE_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }
}
