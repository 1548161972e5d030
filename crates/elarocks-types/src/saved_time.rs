//! `savedtime` key fragments.
//!
//! Records are keyed by `{nodeType}_{savedtime}` where `savedtime` is the
//! event's UTC time at millisecond precision followed by a five digit
//! counter. Sysmon routinely emits several events within one millisecond;
//! the counter keeps their keys distinct and preserves arrival order.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Format of the time portion of a `savedtime` fragment and of Sysmon's
/// `UtcTime` field.
pub const SAVEDTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A point in time plus its same-millisecond sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SavedTime {
    time: DateTime<Utc>,
    counter: u32,
}

impl SavedTime {
    /// Create a saved time from a UTC instant and a sequence number.
    pub const fn new(time: DateTime<Utc>, counter: u32) -> Self {
        Self { time, counter }
    }

    /// The UTC instant.
    pub const fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The same-millisecond sequence number.
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Milliseconds since the Unix epoch. This is the value used as the
    /// pagination cursor.
    pub const fn epoch_millis(&self) -> i64 {
        self.time.timestamp_millis()
    }

    /// The key fragment, e.g. `2023-08-06 15:00:00.12300002`.
    pub fn fragment(&self) -> String {
        format!("{}{:05}", self.time.format(SAVEDTIME_FORMAT), self.counter)
    }
}

/// Parse a Sysmon `UtcTime` value (`2023-08-06 15:00:00.123`).
pub fn parse_utc_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Hands out [`SavedTime`]s for a stream of event times.
///
/// The counter restarts at zero whenever the millisecond changes and
/// increments while it stays the same.
#[derive(Debug, Default)]
pub struct SavedTimeAllocator {
    previous: Option<i64>,
    counter: u32,
}

impl SavedTimeAllocator {
    /// Create an allocator with no history.
    pub const fn new() -> Self {
        Self {
            previous: None,
            counter: 0,
        }
    }

    /// Allocate the next saved time for `time`.
    pub fn allocate(&mut self, time: DateTime<Utc>) -> SavedTime {
        let millis = time.timestamp_millis();
        if self.previous == Some(millis) {
            self.counter = self.counter.saturating_add(1);
        } else {
            self.previous = Some(millis);
            self.counter = 0;
        }
        SavedTime::new(time, self.counter)
    }
}
