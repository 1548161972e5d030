//! The `eventList` union query.
//!
//! Fetches all three event kinds through the shared routine, merges them in
//! time order, then cuts a cursor window out of the merged list.

use elarocks_types::{CursorPagination, EventConnection, EventEdge, EventFilter, NodeType};
use tracing::debug;

use crate::error::FetchError;
use crate::fetch::{Decoding, StoredEvent, collect_events};
use crate::filter::FilterSet;
use crate::paginate::{cursor_window, encode_cursor, page_info};
use crate::source::{RecordCache, TimeIndex};
use crate::window::TimeWindow;

/// Answer an `eventList` query.
///
/// The three fetches run concurrently. They are concatenated in
/// [`NodeType::ALL`] order and stable-sorted by epoch, so events sharing a
/// millisecond keep that order. Each payload's union member comes from its
/// own fields (see [`elarocks_types::resolve_type`]), not from the row.
///
/// # Errors
///
/// Returns [`FetchError::InvalidTime`] or [`FetchError::InvalidCursor`] for
/// bad input, or a store error if any of the three fetches fails.
pub async fn event_list<I, C>(
    index: &I,
    cache: &C,
    filter: &EventFilter,
    pagination: &CursorPagination,
) -> Result<EventConnection, FetchError>
where
    I: TimeIndex,
    C: RecordCache,
{
    let window = TimeWindow::parse(&filter.datetime)?;
    let filters = FilterSet::from_filter(filter);

    let [first, second, third] = NodeType::ALL;
    let (a, b, c) = futures::try_join!(
        collect_events(index, cache, first, &window, &filters, Decoding::ByShape),
        collect_events(index, cache, second, &window, &filters, Decoding::ByShape),
        collect_events(index, cache, third, &window, &filters, Decoding::ByShape),
    )?;

    let mut merged: Vec<StoredEvent> = a.into_iter().chain(b).chain(c).collect();
    merged.sort_by_key(StoredEvent::epoch);

    let epochs: Vec<i64> = merged.iter().map(StoredEvent::epoch).collect();
    let range = cursor_window(&epochs, pagination)?;
    let page_info = page_info(&epochs, &range);
    let total_count = merged.len();

    let edges: Vec<EventEdge> = merged
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .map(|stored| EventEdge {
            cursor: encode_cursor(stored.epoch()),
            node: stored.event,
        })
        .collect();

    debug!(
        total = total_count,
        returned = edges.len(),
        "Built event list"
    );

    Ok(EventConnection {
        edges,
        page_info,
        total_count,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use elarocks_types::SysmonEvent;
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;

    fn all_day() -> EventFilter {
        EventFilter::between("2023-08-06T00:00:00Z", "2023-08-06T23:59:59Z")
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .insert(
                NodeType::RegistryValueSet,
                "2023-08-06 10:00:00.00000000",
                json!({"event_type": "SetValue", "process_id": "4", "user": "SYSTEM"}),
            )
            .await
            .unwrap();
        store
            .insert(
                NodeType::ProcessCreate,
                "2023-08-06 09:00:00.00000000",
                json!({"process_id": "1", "user": "joe"}),
            )
            .await
            .unwrap();
        store
            .insert(
                NodeType::NetworkConnection,
                "2023-08-06 11:00:00.00000000",
                json!({"protocol": "tcp", "process_id": "2", "user": "joe"}),
            )
            .await
            .unwrap();
        store
            .insert(
                NodeType::ProcessCreate,
                "2023-08-06 12:00:00.00000000",
                json!({"process_id": "3", "user": "ann"}),
            )
            .await
            .unwrap();
        store
    }

    fn kinds(conn: &EventConnection) -> Vec<NodeType> {
        conn.edges.iter().map(|e| e.node.node_type()).collect()
    }

    #[tokio::test]
    async fn merges_in_time_order() {
        let store = seeded().await;
        let conn = event_list(&store, &store, &all_day(), &CursorPagination::default())
            .await
            .unwrap();

        assert_eq!(conn.total_count, 4);
        assert_eq!(
            kinds(&conn),
            vec![
                NodeType::ProcessCreate,
                NodeType::RegistryValueSet,
                NodeType::NetworkConnection,
                NodeType::ProcessCreate,
            ]
        );
        let epochs: Vec<i64> = conn
            .edges
            .iter()
            .map(|e| e.cursor.parse().unwrap())
            .collect();
        assert!(epochs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn ties_keep_concatenation_order() {
        let store = MemoryStore::new();
        let fragment = "2023-08-06 10:00:00.00000000";
        store
            .insert(NodeType::NetworkConnection, fragment, json!({"protocol": "udp"}))
            .await
            .unwrap();
        store
            .insert(NodeType::RegistryValueSet, fragment, json!({"event_type": "SetValue"}))
            .await
            .unwrap();
        store
            .insert(NodeType::ProcessCreate, fragment, json!({"image": "cmd.exe"}))
            .await
            .unwrap();

        let conn = event_list(&store, &store, &all_day(), &CursorPagination::default())
            .await
            .unwrap();
        assert_eq!(kinds(&conn), NodeType::ALL.to_vec());
    }

    #[tokio::test]
    async fn last_before_pages_backwards() {
        let store = seeded().await;
        let everything = event_list(&store, &store, &all_day(), &CursorPagination::default())
            .await
            .unwrap();
        let newest = everything.page_info.end_cursor.clone().unwrap();

        let conn = event_list(
            &store,
            &store,
            &all_day(),
            &CursorPagination {
                before: Some(newest),
                last: Some(2),
                ..CursorPagination::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(conn.total_count, 4);
        assert_eq!(
            kinds(&conn),
            vec![NodeType::RegistryValueSet, NodeType::NetworkConnection]
        );
        assert!(conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[tokio::test]
    async fn filters_apply_to_every_kind() {
        let store = seeded().await;
        let filter = EventFilter {
            user: Some("joe".to_owned()),
            ..all_day()
        };
        let conn = event_list(&store, &store, &filter, &CursorPagination::default())
            .await
            .unwrap();

        assert_eq!(conn.total_count, 2);
        assert!(conn.edges.iter().all(|e| e.node.user() == Some("joe")));
        assert!(matches!(conn.edges[1].node, SysmonEvent::NetworkConnection(_)));
    }

    #[tokio::test]
    async fn empty_window_has_no_cursors() {
        let store = seeded().await;
        let filter = EventFilter::between("2024-01-01", "2024-01-02");
        let conn = event_list(&store, &store, &filter, &CursorPagination::default())
            .await
            .unwrap();

        assert!(conn.edges.is_empty());
        assert_eq!(conn.page_info, elarocks_types::PageInfo::default());
    }

    #[tokio::test]
    async fn bad_cursor_is_an_error() {
        let store = seeded().await;
        let err = event_list(
            &store,
            &store,
            &all_day(),
            &CursorPagination {
                after: Some("yesterday".to_owned()),
                ..CursorPagination::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::InvalidCursor(_)));
    }

    #[tokio::test]
    async fn member_follows_payload_fields() {
        let store = MemoryStore::new();
        store
            .insert(
                NodeType::RegistryValueSet,
                "2023-08-06 10:00:00.00000000",
                json!({"target_object": "HKLM\\Run", "process_id": "1"}),
            )
            .await
            .unwrap();
        store
            .insert(
                NodeType::ProcessCreate,
                "2023-08-06 11:00:00.00000000",
                json!({"protocol": "tcp", "process_id": "2"}),
            )
            .await
            .unwrap();

        let conn = event_list(&store, &store, &all_day(), &CursorPagination::default())
            .await
            .unwrap();

        assert_eq!(conn.total_count, 2);
        assert_eq!(
            kinds(&conn),
            vec![NodeType::ProcessCreate, NodeType::NetworkConnection]
        );
        assert!(matches!(conn.edges[0].node, SysmonEvent::ProcessCreate(_)));
        assert_eq!(conn.edges[0].node.process_id(), Some(1));
    }
}
