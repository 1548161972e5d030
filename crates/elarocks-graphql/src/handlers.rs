//! HTTP handlers for the GraphQL server.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/` | Execute a GraphQL request |
//! | `GET` | `/` | GraphiQL explorer |
//! | `GET` | `/health` | Liveness check |

use std::sync::Arc;

use async_graphql::http::GraphiQLSource;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};

use crate::state::AppState;

/// Execute a GraphQL request against the schema.
pub async fn graphql(State(state): State<Arc<AppState>>, req: GraphQLRequest) -> GraphQLResponse {
    let req = req.into_inner();
    tracing::debug!(operation = ?req.operation_name, "Executing GraphQL request");
    state.schema.execute(req).await.into()
}

/// Serve the GraphiQL explorer pointed at this server.
pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/").finish())
}

/// Report that the server is up.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
