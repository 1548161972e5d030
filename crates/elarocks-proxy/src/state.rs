//! Shared state for the proxy route.

use crate::client::GraphqlClient;
use crate::error::ProxyError;
use crate::query::QueryBuilder;

/// Query templates plus the upstream client.
#[derive(Debug)]
pub struct ProxyState {
    /// Document renderer.
    pub queries: QueryBuilder,
    /// Upstream GraphQL client.
    pub client: GraphqlClient,
}

impl ProxyState {
    /// Build state forwarding to `graphql_endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Template`] if the query templates fail to load.
    pub fn new(graphql_endpoint: &str) -> Result<Self, ProxyError> {
        Ok(Self {
            queries: QueryBuilder::new()?,
            client: GraphqlClient::new(graphql_endpoint),
        })
    }
}
