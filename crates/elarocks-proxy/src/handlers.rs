//! Handler for `POST /api/gql`.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;

use crate::error::ProxyError;
use crate::request::ProxyRequest;
use crate::state::ProxyState;

/// Validate the form state, build the query, forward it, and relay the
/// GraphQL server's JSON answer.
///
/// # Errors
///
/// Returns [`ProxyError`] for a malformed body (400) or an upstream
/// failure (500).
pub async fn gql(
    State(state): State<Arc<ProxyState>>,
    body: Result<Json<ProxyRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ProxyError> {
    let Json(request) = body.map_err(|e| ProxyError::InvalidRequest(e.body_text()))?;
    let option = request.check()?;

    tracing::debug!(
        option = %option,
        start = request.start_time.as_str(),
        end = request.end_time.as_str(),
        per_page = request.per_page,
        "Proxying event query"
    );

    let query = state.queries.build(option, &request)?;
    let data = state.client.forward(&query).await?;
    Ok(Json(data))
}
