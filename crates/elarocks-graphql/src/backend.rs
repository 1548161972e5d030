//! Store selection for the GraphQL server.
//!
//! The schema is built over one [`Backend`]. `Live` talks to `PostgreSQL`
//! and `Dragonfly`; `Memory` serves an in-process store for tests and demos.

use std::sync::Arc;

use elarocks_core::config::InfrastructureConfig;
use elarocks_core::{FetchError, MemoryStore, RecordCache, TimeIndex, TimeWindow};
use elarocks_db::{DbError, DragonflyPool, PostgresPool};
use elarocks_types::{IndexRow, NodeType};

/// The stores a schema reads from.
#[derive(Debug, Clone)]
pub enum Backend {
    /// `PostgreSQL` time index plus `Dragonfly` record cache.
    Live {
        /// Time index.
        index: PostgresPool,
        /// Record cache.
        cache: DragonflyPool,
    },
    /// In-process store.
    Memory(Arc<MemoryStore>),
}

impl Backend {
    /// Connect to both live stores and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if either connection or the migrations fail.
    pub async fn connect(config: &InfrastructureConfig) -> Result<Self, DbError> {
        let index = PostgresPool::open(config).await?;
        let cache = DragonflyPool::connect(&config.dragonfly_url).await?;

        Ok(Self::Live { index, cache })
    }

    /// Short name for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Live { .. } => "live",
            Self::Memory(_) => "memory",
        }
    }
}

impl TimeIndex for Backend {
    async fn fetch_rows(
        &self,
        node_type: NodeType,
        window: &TimeWindow,
    ) -> Result<Vec<IndexRow>, FetchError> {
        match self {
            Self::Live { index, .. } => index.fetch_rows(node_type, window).await,
            Self::Memory(store) => store.fetch_rows(node_type, window).await,
        }
    }
}

impl RecordCache for Backend {
    async fn fetch_record(&self, key: &str) -> Result<Option<serde_json::Value>, FetchError> {
        match self {
            Self::Live { cache, .. } => cache.fetch_record(key).await,
            Self::Memory(store) => store.fetch_record(key).await,
        }
    }
}
