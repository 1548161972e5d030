//! GraphQL API server for elarocks.
//!
//! Serves Sysmon events from the hybrid store through an `async-graphql`
//! schema mounted on Axum:
//!
//! - three typed queries (`RegValueSetEve`, `ProcessCreateEve`,
//!   `NetworkConnectionEve`) with offset paging
//! - `eventList`, a time-ordered union of all three with cursor paging
//!
//! # Modules
//!
//! - [`backend`] -- Live or in-memory stores
//! - [`schema`] -- Query root and schema builder
//! - [`handlers`] -- HTTP handlers
//! - [`router`] -- Route table
//! - [`server`] -- Bind and serve
//! - [`error`] -- GraphQL error conversion

pub mod backend;
pub mod error;
pub mod handlers;
pub mod router;
pub mod schema;
pub mod server;
pub mod state;

pub use backend::Backend;
pub use router::build_router;
pub use schema::{EventSchema, QueryRoot, build_schema};
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
