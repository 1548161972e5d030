//! Time index rows.

use serde::{Deserialize, Serialize};

use crate::enums::NodeType;

/// A pointer from the time index to a cached record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexRow {
    /// Kind of event the row points at.
    pub node_type: NodeType,
    /// Key fragment; the record lives at `{node_type}_{savedtime}`.
    pub savedtime: String,
    /// Event time in milliseconds since the Unix epoch.
    pub savedtime_epoch: i64,
}

impl IndexRow {
    /// The cache key of the record this row points at.
    pub fn cache_key(&self) -> String {
        self.node_type.cache_key(&self.savedtime)
    }
}
