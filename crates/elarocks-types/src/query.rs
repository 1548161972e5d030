//! GraphQL input types: filters and pagination.

use async_graphql::InputObject;
use serde::{Deserialize, Serialize};

/// Inclusive time window, as strings exactly as the client sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, InputObject)]
pub struct DateTimeRange {
    /// Window start.
    pub start: String,
    /// Window end.
    pub end: String,
}

/// Filter applied to every event query. All present predicates must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, InputObject)]
#[graphql(rename_fields = "snake_case")]
pub struct EventFilter {
    /// Time window to search.
    pub datetime: DateTimeRange,
    /// Exact process id.
    pub process_id: Option<u32>,
    /// Exact user name.
    pub user: Option<String>,
    /// Substring of the agent id.
    pub agent_id: Option<String>,
}

impl EventFilter {
    /// A filter with only a time window.
    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            datetime: DateTimeRange {
                start: start.into(),
                end: end.into(),
            },
            ..Self::default()
        }
    }
}

/// Offset/limit paging for the typed event queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, InputObject)]
pub struct Pagination {
    /// Number of matching events to skip (default 0).
    pub offset: Option<u32>,
    /// Maximum number of events to return. Absent or 0 means the
    /// configured default.
    pub limit: Option<u32>,
}

/// Cursor paging for `eventList`.
///
/// Cursors are event epochs in milliseconds, as decimal strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, InputObject)]
pub struct CursorPagination {
    /// Return events after this cursor.
    pub after: Option<String>,
    /// Return events before this cursor.
    pub before: Option<String>,
    /// Keep only the first N events of the window.
    pub first: Option<u32>,
    /// Keep only the last N events of the window.
    pub last: Option<u32>,
}
