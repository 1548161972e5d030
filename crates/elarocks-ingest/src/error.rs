//! Error types for the ingest pipeline.

use elarocks_db::DbError;

/// Errors that can occur while loading events.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The search request failed or the cluster returned an error status.
    #[error("elasticsearch error: {0}")]
    Search(String),

    /// The search response did not have the expected shape.
    #[error("unexpected search response: {0}")]
    Response(#[from] serde_json::Error),

    /// A configured event code is not served by the API.
    #[error("unsupported event code: {0}")]
    UnsupportedCode(u32),

    /// Writing to `PostgreSQL` or `Dragonfly` failed.
    #[error(transparent)]
    Store(#[from] DbError),
}
