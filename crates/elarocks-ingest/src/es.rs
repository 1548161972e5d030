//! Elasticsearch search client.
//!
//! One `_search` request per Sysmon event code, filtered by `event.code`
//! and an optional `@timestamp` window.

use elarocks_core::config::ElasticsearchConfig;
use serde_json::{Map, Value, json};

use crate::error::IngestError;

/// Client for the configured indices.
pub struct SearchClient {
    client: reqwest::Client,
    search_url: String,
    username: String,
    password: String,
    size: u32,
    timestamp_start: Option<String>,
    timestamp_end: Option<String>,
}

impl SearchClient {
    /// Build a client from the `elasticsearch` config section.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Search`] if the HTTP client cannot be built.
    pub fn new(config: &ElasticsearchConfig) -> Result<Self, IngestError> {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| IngestError::Search(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            search_url: search_url(&config.url, &config.indices),
            username: config.username.clone(),
            password: config.password.clone(),
            size: config.size,
            timestamp_start: config.timestamp_start.clone(),
            timestamp_end: config.timestamp_end.clone(),
        })
    }

    /// The `_search` URL requests are sent to.
    pub fn url(&self) -> &str {
        &self.search_url
    }

    /// Search for events with the given Sysmon event code.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Search`] if the request fails or the cluster
    /// answers with a non-success status.
    pub async fn search(&self, event_code: u32) -> Result<Value, IngestError> {
        let body = build_query(
            event_code,
            self.timestamp_start.as_deref(),
            self.timestamp_end.as_deref(),
            self.size,
        );

        let mut request = self.client.post(&self.search_url).json(&body);
        if !self.username.is_empty() {
            request = request.basic_auth(&self.username, Some(&self.password));
        }

        let response = request
            .send()
            .await
            .map_err(|e| IngestError::Search(format!("search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(IngestError::Search(format!(
                "search returned {status}: {error_body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| IngestError::Search(format!("search response parse failed: {e}")))
    }
}

/// `{url}/{index,index}/_search`.
fn search_url(base: &str, indices: &[String]) -> String {
    format!("{}/{}/_search", base.trim_end_matches('/'), indices.join(","))
}

/// Search body matching one event code, bounded by `@timestamp` when
/// either end of the window is set.
pub fn build_query(event_code: u32, start: Option<&str>, end: Option<&str>, size: u32) -> Value {
    let mut must = vec![json!({ "match": { "event.code": event_code.to_string() } })];

    let mut range = Map::new();
    if let Some(start) = start {
        range.insert("gte".to_owned(), Value::from(start));
    }
    if let Some(end) = end {
        range.insert("lt".to_owned(), Value::from(end));
    }
    if !range.is_empty() {
        must.push(json!({ "range": { "@timestamp": range } }));
    }

    json!({
        "query": { "bool": { "must": must } },
        "size": size,
    })
}
