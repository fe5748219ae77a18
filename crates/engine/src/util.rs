//! Internal helpers for validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! id/date parsing so every operation applies the same rules.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parse a record id received from a caller.
pub(crate) fn parse_record_id(value: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value.trim())
        .map_err(|_| EngineError::InvalidId(format!("\"{value}\" is not a valid record id")))
}

/// Parse a business date into a comparable UTC instant.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 and naive date-times (read as UTC).
pub(crate) fn parse_business_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.naive_utc());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Validate a business date on the write path.
pub(crate) fn validate_business_date(value: &str, lenient: bool) -> ResultEngine<String> {
    let trimmed = value.trim();
    if !lenient && parse_business_date(trimmed).is_none() {
        return Err(EngineError::InvalidDate(format!(
            "\"{value}\" is not a valid date"
        )));
    }
    Ok(trimmed.to_string())
}

/// Sort key for the merged feed: unparsable dates are the earliest possible.
pub(crate) fn date_sort_key(value: &str) -> NaiveDateTime {
    parse_business_date(value).unwrap_or(NaiveDateTime::MIN)
}

/// Hands out strictly increasing insertion timestamps, even if the wall
/// clock stalls or goes backwards.
#[derive(Debug)]
pub(crate) struct MonotonicClock {
    last: std::sync::Mutex<DateTime<Utc>>,
}

impl MonotonicClock {
    pub(crate) fn new() -> Self {
        Self {
            last: std::sync::Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    pub(crate) fn stamp(&self) -> DateTime<Utc> {
        let now = Utc::now();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *last = if now > *last {
            now
        } else {
            *last + chrono::TimeDelta::microseconds(1)
        };
        *last
    }
}
