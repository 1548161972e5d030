//! Time windows parsed from client input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use elarocks_types::DateTimeRange;

use crate::error::FetchError;

/// Naive layouts accepted for window bounds. Values are read as UTC.
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// An inclusive UTC time window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// First instant in the window.
    pub start: DateTime<Utc>,
    /// Last instant in the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Parse a client-supplied range.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidTime`] if either bound is not a
    /// recognised timestamp.
    pub fn parse(range: &DateTimeRange) -> Result<Self, FetchError> {
        Ok(Self {
            start: parse_instant(&range.start)?,
            end: parse_instant(&range.end)?,
        })
    }

    /// Whether the window can contain anything at all.
    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// Whether `t` falls inside the window.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Whether an epoch (milliseconds) falls inside the window.
    pub fn contains_millis(&self, millis: i64) -> bool {
        self.start.timestamp_millis() <= millis && millis <= self.end.timestamp_millis()
    }
}

/// Parse one bound: RFC 3339, a naive date-time, or a bare date (midnight).
///
/// # Errors
///
/// Returns [`FetchError::InvalidTime`] if no layout matches.
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>, FetchError> {
    let value = value.trim();

    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Ok(t.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .ok_or_else(|| FetchError::InvalidTime(value.to_owned()))
}
