//! The two collaborators every query talks to.
//!
//! [`TimeIndex`] answers "which events of this kind happened in this
//! window", [`RecordCache`] answers "what is the full payload behind this
//! key". Production wires them to `PostgreSQL` and `Dragonfly`; tests and
//! local demos use [`crate::memory::MemoryStore`].
//!
//! The futures are `Send` so resolvers can run on a multi-threaded runtime.

use std::future::Future;

use elarocks_types::{IndexRow, NodeType};

use crate::error::FetchError;
use crate::window::TimeWindow;

/// Time-range lookup of row keys.
pub trait TimeIndex: Send + Sync {
    /// All rows of `node_type` whose time falls inside `window`.
    fn fetch_rows(
        &self,
        node_type: NodeType,
        window: &TimeWindow,
    ) -> impl Future<Output = Result<Vec<IndexRow>, FetchError>> + Send;
}

/// Key-value lookup of full event payloads.
pub trait RecordCache: Send + Sync {
    /// The raw JSON payload stored at `key`, or `None` on a miss.
    fn fetch_record(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<serde_json::Value>, FetchError>> + Send;
}
