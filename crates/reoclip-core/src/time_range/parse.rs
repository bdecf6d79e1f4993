//! Parse user-supplied start/end times.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::FetchError;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parses `YYYY-MM-DD [HH:MM[:SS]]` (or `/` separators, or ISO `T`) into a
/// camera-local instant. A bare date means midnight at the start of that day.
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, FetchError> {
    let s = input.trim();
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d.and_time(NaiveTime::MIN));
        }
    }
    Err(FetchError::Validation(format!(
        "unable to parse date '{}'; supported formats: YYYY-MM-DD [HH:MM[:SS]] or YYYY/MM/DD [HH:MM[:SS]]",
        input
    )))
}
