//! Forwarding of rendered queries to the GraphQL server.

use crate::error::ProxyError;
use crate::query::GraphqlQuery;

/// HTTP client for the GraphQL server.
#[derive(Debug, Clone)]
pub struct GraphqlClient {
    client: reqwest::Client,
    endpoint: String,
}

impl GraphqlClient {
    /// Create a client posting to `endpoint`.
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_owned(),
        }
    }

    /// The configured endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `query` and return the JSON body unchanged. No retries.
    ///
    /// GraphQL-level errors come back inside a 200 body and are passed
    /// through; only transport failures and error statuses fail here.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Upstream`] if the request fails, the server
    /// answers with a non-success status, or the body is not JSON.
    pub async fn forward(&self, query: &GraphqlQuery) -> Result<serde_json::Value, ProxyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(query)
            .send()
            .await
            .map_err(|e| ProxyError::Upstream(format!("GraphQL request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(ProxyError::Upstream(format!(
                "GraphQL server returned {status}: {error_body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| ProxyError::Upstream(format!("GraphQL response parse failed: {e}")))
    }
}
