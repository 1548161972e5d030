//! Rendered proxy documents executed against the real GraphQL schema.
//!
//! Catches field selections that drift from the schema, and selections
//! that silently leave record fields behind.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use async_graphql::{Request, Variables};
use elarocks_core::MemoryStore;
use elarocks_core::config::PaginationConfig;
use elarocks_graphql::{Backend, EventSchema, build_schema};
use elarocks_proxy::{ProxyRequest, QueryBuilder};
use elarocks_types::NodeType;
use serde_json::{Value, json};

async fn schema() -> EventSchema {
    let store = MemoryStore::new();
    store
        .insert(
            NodeType::NetworkConnection,
            "2023-08-06 15:00:01.00000000",
            json!({
                "protocol": "tcp",
                "initiated": "true",
                "source_is_ipv6": "false",
                "source_ip": "10.0.0.5",
                "destination_is_ipv6": "true",
                "destination_ip": "2001:db8::1",
                "destination_port": "443"
            }),
        )
        .await
        .unwrap();
    store
        .insert(
            NodeType::ProcessCreate,
            "2023-08-06 15:00:02.00000000",
            json!({ "process_id": "4242", "hashes": "SHA256=ABCD" }),
        )
        .await
        .unwrap();
    build_schema(
        Arc::new(Backend::Memory(Arc::new(store))),
        PaginationConfig::default(),
    )
}

fn form(option: &str) -> ProxyRequest {
    ProxyRequest {
        start_time: "2023-08-06T15:00:00Z".to_owned(),
        end_time: "2023-08-06T16:00:00Z".to_owned(),
        per_page: 10,
        before: None,
        selected_option: option.to_owned(),
    }
}

async fn run(option: &str) -> Value {
    let request = form(option);
    let document = QueryBuilder::new()
        .unwrap()
        .build(request.check().unwrap(), &request)
        .unwrap();

    let response = schema()
        .await
        .execute(
            Request::new(document.query).variables(Variables::from_json(document.variables)),
        )
        .await;
    assert!(response.errors.is_empty(), "{option}: {:?}", response.errors);
    response.data.into_json().unwrap()
}

#[tokio::test]
async fn test_every_option_runs_against_schema() {
    for option in [
        "RegValueSetEve",
        "ProcessCreateEve",
        "NetworkConnectionEve",
        "eventList",
    ] {
        let data = run(option).await;
        assert!(data[option]["totalCount"].is_number(), "{option}");
    }
}

#[tokio::test]
async fn test_network_document_returns_ipv6_flags() {
    let data = run("NetworkConnectionEve").await;
    let node = &data["NetworkConnectionEve"]["node"][0];
    assert_eq!(node["source_is_ipv6"], false);
    assert_eq!(node["destination_is_ipv6"], true);
    assert_eq!(node["destination_ip"], "2001:db8::1");
}

#[tokio::test]
async fn test_event_list_document_returns_ipv6_flags() {
    let data = run("eventList").await;
    let edges = data["eventList"]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 2);
    assert_eq!(edges[0]["node"]["__typename"], "NetworkConnectionEve");
    assert_eq!(edges[0]["node"]["destination_is_ipv6"], true);
    assert_eq!(edges[1]["node"]["__typename"], "ProcessCreateEve");
}
