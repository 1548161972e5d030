//! [`DbError`] wraps the `sqlx` and `fred` driver errors.
//!
//! Resolvers never see it: the [`elarocks_core::TimeIndex`] and
//! [`elarocks_core::RecordCache`] impls flatten it into [`FetchError`].

use elarocks_core::FetchError;

/// Failure talking to the time index or the record cache.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Time index query or connection failure.
    #[error("time index: {0}")]
    Postgres(#[from] sqlx::Error),

    /// The `event_index` schema could not be brought up to date.
    #[error("time index migration: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record cache command or connection failure.
    #[error("record cache: {0}")]
    Dragonfly(#[from] fred::error::Error),

    /// A record could not be encoded or a cached value is not JSON.
    #[error("record encoding: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An `event_index` row that no served node type can explain.
    #[error("corrupt index row: {0}")]
    CorruptRow(String),

    /// A malformed connection string.
    #[error("store configuration: {0}")]
    Config(String),
}

impl DbError {
    /// As a time index failure.
    pub fn into_index_error(self) -> FetchError {
        FetchError::Index(self.to_string())
    }

    /// As a record cache failure.
    pub fn into_cache_error(self) -> FetchError {
        FetchError::Cache(self.to_string())
    }
}
