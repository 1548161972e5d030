//! Query layer for elarocks.
//!
//! Everything between the GraphQL schema and the stores lives here: the
//! configuration loader, the shared fetch-and-filter routine, pagination,
//! and the `eventList` union. Stores are reached only through the
//! [`TimeIndex`] and [`RecordCache`] traits.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`error`] -- [`FetchError`]
//! - [`source`] -- Store traits
//! - [`window`] -- Time window parsing
//! - [`filter`] -- Filter predicates
//! - [`fetch`] -- The shared fetch-and-filter routine
//! - [`paginate`] -- Offset and cursor pagination
//! - [`union`] -- `eventList`
//! - [`memory`] -- In-memory store

pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod memory;
pub mod paginate;
pub mod source;
pub mod union;
pub mod window;

pub use config::{AppConfig, ConfigError};
pub use error::FetchError;
pub use fetch::{
    Decoding, EventPage, StoredEvent, collect_events, fetch_sysmon_data, fetch_sysmon_data_by_label,
};
pub use filter::{FilterSet, Predicate};
pub use memory::MemoryStore;
pub use source::{RecordCache, TimeIndex};
pub use union::event_list;
pub use window::TimeWindow;
