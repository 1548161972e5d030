//! The GraphQL schema: three typed event queries and the `eventList` union.
//!
//! | Field | Returns |
//! |-------|---------|
//! | `RegValueSetEve(filter, pagination)` | `RegValueSetEveResult` |
//! | `ProcessCreateEve(filter, pagination)` | `ProcessCreateEveResult` |
//! | `NetworkConnectionEve(filter, pagination)` | `NetworkConnectionEveResult` |
//! | `eventList(filter, pagination)` | `EventConnection` |

use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema};
use elarocks_core::config::PaginationConfig;
use elarocks_core::{EventPage, event_list, fetch_sysmon_data};
use elarocks_types::{
    CursorPagination, EventConnection, EventFilter, NetworkConnectionPage, NodeType, Pagination,
    ProcessCreatePage, RegistryValueSetPage, SysmonEvent,
};

use crate::backend::Backend;
use crate::error::to_graphql_error;

/// The full schema type.
pub type EventSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Build the schema over `backend`.
///
/// The schema is injected with:
/// - `Arc<Backend>` for store access
/// - [`PaginationConfig`] for the default page size
pub fn build_schema(backend: Arc<Backend>, pagination: PaginationConfig) -> EventSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(backend)
        .data(pagination)
        .finish()
}

/// Root query type.
#[derive(Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Registry value set events (Sysmon event 13) in a time window.
    #[graphql(name = "RegValueSetEve")]
    async fn reg_value_set_eve(
        &self,
        ctx: &Context<'_>,
        filter: EventFilter,
        pagination: Option<Pagination>,
    ) -> async_graphql::Result<RegistryValueSetPage> {
        let page = typed_page(ctx, NodeType::RegistryValueSet, &filter, pagination).await?;
        Ok(RegistryValueSetPage {
            node: page
                .node
                .into_iter()
                .filter_map(|event| match event {
                    SysmonEvent::RegistryValueSet(e) => Some(e),
                    _ => None,
                })
                .collect(),
            total_count: page.total_count,
        })
    }

    /// Process creation events (Sysmon event 1) in a time window.
    #[graphql(name = "ProcessCreateEve")]
    async fn process_create_eve(
        &self,
        ctx: &Context<'_>,
        filter: EventFilter,
        pagination: Option<Pagination>,
    ) -> async_graphql::Result<ProcessCreatePage> {
        let page = typed_page(ctx, NodeType::ProcessCreate, &filter, pagination).await?;
        Ok(ProcessCreatePage {
            node: page
                .node
                .into_iter()
                .filter_map(|event| match event {
                    SysmonEvent::ProcessCreate(e) => Some(e),
                    _ => None,
                })
                .collect(),
            total_count: page.total_count,
        })
    }

    /// Network connection events (Sysmon event 3) in a time window.
    #[graphql(name = "NetworkConnectionEve")]
    async fn network_connection_eve(
        &self,
        ctx: &Context<'_>,
        filter: EventFilter,
        pagination: Option<Pagination>,
    ) -> async_graphql::Result<NetworkConnectionPage> {
        let page = typed_page(ctx, NodeType::NetworkConnection, &filter, pagination).await?;
        Ok(NetworkConnectionPage {
            node: page
                .node
                .into_iter()
                .filter_map(|event| match event {
                    SysmonEvent::NetworkConnection(e) => Some(e),
                    _ => None,
                })
                .collect(),
            total_count: page.total_count,
        })
    }

    /// All three event kinds merged in time order, with cursor paging.
    async fn event_list(
        &self,
        ctx: &Context<'_>,
        filter: EventFilter,
        pagination: Option<CursorPagination>,
    ) -> async_graphql::Result<EventConnection> {
        let backend = ctx.data::<Arc<Backend>>()?;
        let pagination = pagination.unwrap_or_default();

        event_list(backend.as_ref(), backend.as_ref(), &filter, &pagination)
            .await
            .map_err(to_graphql_error)
    }
}

async fn typed_page(
    ctx: &Context<'_>,
    node_type: NodeType,
    filter: &EventFilter,
    pagination: Option<Pagination>,
) -> async_graphql::Result<EventPage> {
    let backend = ctx.data::<Arc<Backend>>()?;
    let defaults = ctx.data::<PaginationConfig>()?;

    fetch_sysmon_data(
        backend.as_ref(),
        backend.as_ref(),
        node_type,
        filter,
        pagination.as_ref(),
        defaults.default_limit,
    )
    .await
    .map_err(to_graphql_error)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use elarocks_core::MemoryStore;
    use serde_json::json;

    use super::*;

    async fn schema() -> EventSchema {
        let store = MemoryStore::new();
        store
            .insert(
                NodeType::ProcessCreate,
                "2023-08-06 15:00:00.00000000",
                json!({"process_id": "10", "user": "joe", "hashes": "SHA1=AA,MD5=BB"}),
            )
            .await
            .unwrap();
        store
            .insert(
                NodeType::RegistryValueSet,
                "2023-08-06 15:00:01.00000000",
                json!({"event_type": "SetValue", "target_object": "HKLM\\Run"}),
            )
            .await
            .unwrap();
        build_schema(
            Arc::new(Backend::Memory(Arc::new(store))),
            PaginationConfig::default(),
        )
    }

    #[tokio::test]
    async fn sdl_exposes_query_fields() {
        let sdl = schema().await.sdl();
        assert!(sdl.contains("RegValueSetEve(filter: EventFilter!, pagination: Pagination)"));
        assert!(sdl.contains("eventList(filter: EventFilter!, pagination: CursorPagination)"));
        assert!(sdl.contains("union SysmonEvent"));
        assert!(sdl.contains("process_id: Int"));
    }

    #[tokio::test]
    async fn typed_query_returns_page() {
        let res = schema()
            .await
            .execute(
                r#"{ ProcessCreateEve(filter: { datetime: { start: "2023-08-06", end: "2023-08-07" } }) {
                    totalCount
                    node { process_id user hashes }
                } }"#,
            )
            .await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);

        let data = res.data.into_json().unwrap();
        assert_eq!(data["ProcessCreateEve"]["totalCount"], 1);
        assert_eq!(data["ProcessCreateEve"]["node"][0]["process_id"], 10);
        assert_eq!(
            data["ProcessCreateEve"]["node"][0]["hashes"],
            json!(["SHA1=AA", "MD5=BB"])
        );
    }

    #[tokio::test]
    async fn union_resolves_member_types() {
        let res = schema()
            .await
            .execute(
                r#"{ eventList(filter: { datetime: { start: "2023-08-06", end: "2023-08-07" } }) {
                    totalCount
                    edges { cursor node { __typename } }
                    pageInfo { hasNextPage hasPreviousPage }
                } }"#,
            )
            .await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);

        let data = res.data.into_json().unwrap();
        let edges = &data["eventList"]["edges"];
        assert_eq!(edges[0]["node"]["__typename"], "ProcessCreateEve");
        assert_eq!(edges[1]["node"]["__typename"], "RegValueSetEve");
        assert_eq!(data["eventList"]["pageInfo"]["hasNextPage"], false);
    }

    #[tokio::test]
    async fn union_member_follows_payload_not_row() {
        let store = MemoryStore::new();
        store
            .insert(
                NodeType::RegistryValueSet,
                "2023-08-06 15:00:00.00000000",
                json!({"target_object": "HKLM\\Run", "process_id": "1"}),
            )
            .await
            .unwrap();
        let schema = build_schema(
            Arc::new(Backend::Memory(Arc::new(store))),
            PaginationConfig::default(),
        );

        let res = schema
            .execute(
                r#"{ eventList(filter: { datetime: { start: "2023-08-06", end: "2023-08-07" } }) {
                    edges { node { __typename ... on ProcessCreateEve { process_id } } }
                } }"#,
            )
            .await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);

        let data = res.data.into_json().unwrap();
        let node = &data["eventList"]["edges"][0]["node"];
        assert_eq!(node["__typename"], "ProcessCreateEve");
        assert_eq!(node["process_id"], 1);

        let typed = schema
            .execute(
                r#"{ RegValueSetEve(filter: { datetime: { start: "2023-08-06", end: "2023-08-07" } }) {
                    totalCount
                } }"#,
            )
            .await;
        assert!(typed.errors.is_empty(), "{:?}", typed.errors);
        assert_eq!(typed.data.into_json().unwrap()["RegValueSetEve"]["totalCount"], 1);
    }

    #[tokio::test]
    async fn bad_cursor_is_a_user_error() {
        let res = schema()
            .await
            .execute(
                r#"{ eventList(
                    filter: { datetime: { start: "2023-08-06", end: "2023-08-07" } },
                    pagination: { after: "nope" }
                ) { totalCount } }"#,
            )
            .await;
        assert_eq!(res.errors.len(), 1);
        assert_eq!(
            res.errors[0].message,
            "invalid cursor: nope (invalid digit found in string)"
        );
    }
}
