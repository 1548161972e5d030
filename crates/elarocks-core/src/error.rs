//! Error types for the query layer.

use elarocks_types::UnknownNodeType;

/// Errors that can occur while answering an event query.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A node type label is not one of the served Sysmon events.
    #[error(transparent)]
    UnknownNodeType(#[from] UnknownNodeType),

    /// A time window bound could not be parsed.
    #[error("invalid time window: {0}")]
    InvalidTime(String),

    /// A pagination cursor is not an epoch timestamp.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// The time index could not be queried.
    #[error("time index error: {0}")]
    Index(String),

    /// The record cache could not be queried.
    #[error("record cache error: {0}")]
    Cache(String),
}
