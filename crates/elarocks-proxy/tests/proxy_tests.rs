//! Integration tests for `POST /api/gql`.
//!
//! The proxy router is driven via `tower::ServiceExt`. The upstream
//! GraphQL server is a small Axum app on an ephemeral local port that
//! echoes what it received, so the tests can see the forwarded request.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use elarocks_proxy::{ProxyState, build_router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Start an upstream that answers `{"data": {"echo": <request body>}}`.
async fn spawn_echo_upstream() -> String {
    async fn echo(Json(body): Json<Value>) -> Json<Value> {
        Json(json!({ "data": { "echo": body } }))
    }

    let app = axum::Router::new().route("/", post(echo));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

/// Start an upstream that always fails with 502.
async fn spawn_failing_upstream() -> String {
    async fn fail() -> (StatusCode, &'static str) {
        (StatusCode::BAD_GATEWAY, "down")
    }

    let app = axum::Router::new().route("/", post(fail));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/")
}

/// An address nothing listens on.
async fn closed_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/")
}

fn post_json(body: &Value) -> Request<Body> {
    Request::post("/api/gql")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn form(option: &str) -> Value {
    json!({
        "startTime": "2023-08-06T15:00:00Z",
        "endTime": "2023-08-06T16:00:00Z",
        "perPage": 10,
        "before": null,
        "selectedOption": option
    })
}

#[tokio::test]
async fn test_forwards_typed_query() {
    let endpoint = spawn_echo_upstream().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let response = router
        .oneshot(post_json(&form("RegValueSetEve")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let forwarded = &json["data"]["echo"];
    let query = forwarded["query"].as_str().unwrap();
    assert!(query.contains("RegValueSetEve("));
    assert!(query.contains("target_object"));
    assert_eq!(forwarded["variables"]["limit"], 10);
    assert_eq!(forwarded["variables"]["start"], "2023-08-06T15:00:00Z");
}

#[tokio::test]
async fn test_forwards_event_list_with_cursor() {
    let endpoint = spawn_echo_upstream().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let mut body = form("eventList");
    body["before"] = json!("1691334000000");

    let response = router.oneshot(post_json(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let forwarded = &json["data"]["echo"];
    assert!(forwarded["query"].as_str().unwrap().contains("eventList("));
    assert_eq!(forwarded["variables"]["last"], 10);
    assert_eq!(forwarded["variables"]["before"], "1691334000000");
}

#[tokio::test]
async fn test_upstream_error_status_is_500() {
    let endpoint = spawn_failing_upstream().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let response = router
        .oneshot(post_json(&form("ProcessCreateEve")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json, json!({ "message": "Error fetching data" }));
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    let endpoint = closed_endpoint().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let response = router
        .oneshot(post_json(&form("NetworkConnectionEve")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Error fetching data");
}

#[tokio::test]
async fn test_unknown_option_is_400() {
    let endpoint = closed_endpoint().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let response = router
        .oneshot(post_json(&form("rawEvents")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "unknown query option: rawEvents");
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let endpoint = closed_endpoint().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let response = router
        .oneshot(post_json(&json!({ "startTime": "x" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert!(json["message"].as_str().unwrap().starts_with("invalid request"));
}

#[tokio::test]
async fn test_get_is_method_not_allowed() {
    let endpoint = closed_endpoint().await;
    let router = build_router(Arc::new(ProxyState::new(&endpoint).unwrap()));

    let response = router
        .oneshot(Request::get("/api/gql").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
