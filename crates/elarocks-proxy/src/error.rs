//! Error types for the proxy route.
//!
//! [`ProxyError`] converts into the JSON body the web front end expects:
//! `{ "message": ... }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Message returned for every upstream failure.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching data";

/// Errors that can occur while proxying a request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// The request body failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// `selectedOption` does not name a query.
    #[error("unknown query option: {0}")]
    UnknownOption(String),

    /// A query document could not be rendered.
    #[error("template error: {0}")]
    Template(String),

    /// The GraphQL server was unreachable or answered with an error status.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl ProxyError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::UnknownOption(_) => StatusCode::BAD_REQUEST,
            Self::Template(_) | Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status == StatusCode::BAD_REQUEST {
            self.to_string()
        } else {
            tracing::error!(error = %self, "Proxy request failed");
            FETCH_FAILED_MESSAGE.to_owned()
        };

        let body = serde_json::json!({ "message": message });
        (status, axum::Json(body)).into_response()
    }
}
