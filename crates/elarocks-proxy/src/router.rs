//! Axum router for the proxy.

use std::sync::Arc;

use axum::Router;
use axum::routing::post;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::ProxyState;

/// Path the web front end posts to.
pub const GQL_PATH: &str = "/api/gql";

/// Build the router. Only `POST /api/gql` is served; other methods on that
/// path get `405 Method Not Allowed`.
pub fn build_router(state: Arc<ProxyState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(GQL_PATH, post(handlers::gql))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
