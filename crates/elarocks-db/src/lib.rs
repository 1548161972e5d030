//! Data layer for elarocks (`PostgreSQL` + `Dragonfly`).
//!
//! `PostgreSQL` holds the time index, `Dragonfly` the full records. Queries
//! read the index for a time range and then look each record up by key.
//!
//! ```text
//! GraphQL resolver
//!     |
//!     +-- rows in window --> PostgreSQL (PostgresPool, EventIndexStore)
//!     |
//!     +-- record per row --> Dragonfly  (DragonflyPool)
//! ```
//!
//! [`PostgresPool`] implements [`elarocks_core::TimeIndex`] and
//! [`DragonflyPool`] implements [`elarocks_core::RecordCache`].
//!
//! # Modules
//!
//! - [`dragonfly`] -- Record cache operations
//! - [`postgres`] -- Connection pool and migrations
//! - [`event_index`] -- Index inserts and range queries
//! - [`error`] -- [`DbError`]

pub mod dragonfly;
pub mod error;
pub mod event_index;
pub mod postgres;

pub use dragonfly::DragonflyPool;
pub use error::DbError;
pub use event_index::{EventIndexRow, EventIndexStore};
pub use postgres::{PostgresConfig, PostgresPool};
