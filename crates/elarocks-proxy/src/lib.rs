//! Proxy route for the elarocks web front end.
//!
//! The front end posts its form state (`startTime`, `endTime`, `perPage`,
//! `before`, `selectedOption`) to `POST /api/gql`. The proxy renders the
//! GraphQL document for the selected query, forwards it to the GraphQL
//! server, and relays the JSON answer.
//!
//! ```text
//! browser --POST /api/gql--> proxy --POST /--> GraphQL server
//! ```

pub mod client;
pub mod error;
pub mod handlers;
pub mod query;
pub mod request;
pub mod router;
pub mod server;
pub mod state;

pub use client::GraphqlClient;
pub use error::ProxyError;
pub use query::{GraphqlQuery, QueryBuilder};
pub use request::{ProxyRequest, QueryOption};
pub use router::build_router;
pub use server::{ProxyServerConfig, ProxyServerError, start_proxy};
pub use state::ProxyState;
