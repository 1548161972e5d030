//! Shared type definitions for elarocks.
//!
//! This crate is the single source of truth for the Sysmon event records,
//! GraphQL inputs, and connection wrappers used across the workspace. Event
//! records flow downstream to `TypeScript` via `ts-rs` for the web front end.
//!
//! # Modules
//!
//! - [`enums`] -- [`NodeType`], the Sysmon event label
//! - [`events`] -- Typed event records and the [`SysmonEvent`] union
//! - [`query`] -- Filter and pagination inputs
//! - [`connection`] -- Result pages, edges, and page info
//! - [`rows`] -- Time index rows
//! - [`saved_time`] -- `savedtime` key fragments
//! - [`de`] -- Lenient payload deserializers

pub mod connection;
pub mod de;
pub mod enums;
pub mod events;
pub mod query;
pub mod rows;
pub mod saved_time;

// Re-export all public types at crate root for convenience.
pub use connection::{
    EventConnection, EventEdge, NetworkConnectionPage, PageInfo, ProcessCreatePage,
    RegistryValueSetPage,
};
pub use enums::{NodeType, UnknownNodeType};
pub use events::{
    resolve_type, NetworkConnectionEvent, ProcessCreateEvent, RegistryValueSetEvent, SysmonEvent,
};
pub use query::{CursorPagination, DateTimeRange, EventFilter, Pagination};
pub use rows::IndexRow;
pub use saved_time::{parse_utc_time, SavedTime, SavedTimeAllocator, SAVEDTIME_FORMAT};
