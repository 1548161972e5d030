//! Shared fetch-and-filter routine behind the typed event queries.
//!
//! ```text
//! time index (rows) -> cache lookup per row -> decode -> filter -> page
//! ```
//!
//! Lookups run one row at a time in row order. Rows without a cached
//! payload are skipped, and so are payloads that fail to decode; neither
//! counts toward `totalCount`.

use elarocks_types::{EventFilter, IndexRow, NodeType, Pagination, SysmonEvent, resolve_type};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::filter::FilterSet;
use crate::paginate::slice_offset;
use crate::source::{RecordCache, TimeIndex};
use crate::window::TimeWindow;

/// How a cached payload picks its record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoding {
    /// The row's node type decides. Typed queries read this way.
    ByRow,
    /// The payload's own fields decide, via [`resolve_type`]. The
    /// `eventList` union reads this way.
    ByShape,
}

impl Decoding {
    fn decode(
        self,
        node_type: NodeType,
        payload: Value,
    ) -> Result<SysmonEvent, serde_json::Error> {
        match self {
            Self::ByRow => SysmonEvent::decode(node_type, payload),
            Self::ByShape => SysmonEvent::decode(resolve_type(&payload), payload),
        }
    }
}

/// A decoded event together with the index row that pointed at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// The time index row.
    pub row: IndexRow,
    /// The decoded record.
    pub event: SysmonEvent,
}

impl StoredEvent {
    /// The event's epoch in milliseconds.
    pub const fn epoch(&self) -> i64 {
        self.row.savedtime_epoch
    }
}

/// One page of a typed event query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventPage {
    /// Events in the requested page.
    pub node: Vec<SysmonEvent>,
    /// Number of matching events before paging.
    pub total_count: usize,
}

/// Retrieve, enrich, decode, and filter every event of `node_type` in
/// `window`.
///
/// `decoding` picks the record type of each payload. With
/// [`Decoding::ByShape`] an event may come back as a different member than
/// its row's node type.
///
/// # Errors
///
/// Returns [`FetchError::Index`] or [`FetchError::Cache`] if a store
/// call fails.
pub async fn collect_events<I, C>(
    index: &I,
    cache: &C,
    node_type: NodeType,
    window: &TimeWindow,
    filters: &FilterSet,
    decoding: Decoding,
) -> Result<Vec<StoredEvent>, FetchError>
where
    I: TimeIndex,
    C: RecordCache,
{
    if window.is_empty() {
        return Ok(Vec::new());
    }

    let rows = index.fetch_rows(node_type, window).await?;
    let row_count = rows.len();
    let mut events = Vec::with_capacity(row_count);

    for row in rows {
        let key = row.cache_key();
        let Some(payload) = cache.fetch_record(&key).await? else {
            debug!(key, "No cached record for index row");
            continue;
        };

        let event = match decoding.decode(row.node_type, payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(key, error = %e, "Skipping undecodable record");
                continue;
            }
        };

        if filters.matches(&event) {
            events.push(StoredEvent { row, event });
        }
    }

    debug!(
        node_type = %node_type,
        rows = row_count,
        matched = events.len(),
        "Collected events"
    );

    Ok(events)
}

/// Answer a typed event query: collect matching events, then apply
/// offset/limit paging.
///
/// `default_limit` applies when `pagination` has no limit or a limit of 0.
///
/// # Errors
///
/// Returns [`FetchError::InvalidTime`] for an unparsable window, or a
/// store error from [`collect_events`].
pub async fn fetch_sysmon_data<I, C>(
    index: &I,
    cache: &C,
    node_type: NodeType,
    filter: &EventFilter,
    pagination: Option<&Pagination>,
    default_limit: u32,
) -> Result<EventPage, FetchError>
where
    I: TimeIndex,
    C: RecordCache,
{
    let window = TimeWindow::parse(&filter.datetime)?;
    let filters = FilterSet::from_filter(filter);

    let events =
        collect_events(index, cache, node_type, &window, &filters, Decoding::ByRow).await?;
    let total_count = events.len();
    let node = slice_offset(events, pagination, default_limit)
        .into_iter()
        .map(|stored| stored.event)
        .collect();

    Ok(EventPage { node, total_count })
}

/// [`fetch_sysmon_data`] for a node type given by its label.
///
/// # Errors
///
/// Returns [`FetchError::UnknownNodeType`] if `label` is not a served
/// Sysmon event, otherwise as [`fetch_sysmon_data`].
pub async fn fetch_sysmon_data_by_label<I, C>(
    index: &I,
    cache: &C,
    label: &str,
    filter: &EventFilter,
    pagination: Option<&Pagination>,
    default_limit: u32,
) -> Result<EventPage, FetchError>
where
    I: TimeIndex,
    C: RecordCache,
{
    let node_type: NodeType = label.parse()?;
    fetch_sysmon_data(index, cache, node_type, filter, pagination, default_limit).await
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryStore;

    const START: &str = "2023-08-06 15:00:00";
    const END: &str = "2023-08-06 16:00:00";

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        for (i, user) in ["joe", "ann", "joe", "bob", "joe"].iter().enumerate() {
            let pid = u32::try_from(i).unwrap() + 100;
            store
                .insert(
                    NodeType::ProcessCreate,
                    &format!("2023-08-06 15:00:0{i}.000"),
                    json!({
                        "process_id": pid.to_string(),
                        "user": user,
                        "agent_id": format!("agent-{i}"),
                        "hashes": "SHA1=AA,MD5=BB"
                    }),
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn pages_after_filtering() {
        let store = seeded().await;
        let filter = EventFilter {
            user: Some("joe".to_owned()),
            ..EventFilter::between(START, END)
        };
        let page = fetch_sysmon_data(
            &store,
            &store,
            NodeType::ProcessCreate,
            &filter,
            Some(&Pagination {
                offset: Some(1),
                limit: Some(1),
            }),
            10,
        )
        .await
        .unwrap();

        assert_eq!(page.total_count, 3);
        assert_eq!(page.node.len(), 1);
        assert_eq!(page.node[0].process_id(), Some(102));
    }

    #[tokio::test]
    async fn splits_hashes() {
        let store = seeded().await;
        let page = fetch_sysmon_data(
            &store,
            &store,
            NodeType::ProcessCreate,
            &EventFilter::between(START, END),
            None,
            10,
        )
        .await
        .unwrap();

        let SysmonEvent::ProcessCreate(first) = &page.node[0] else {
            unreachable!("only process events were seeded");
        };
        assert_eq!(first.hashes, vec!["SHA1=AA", "MD5=BB"]);
    }

    #[tokio::test]
    async fn skips_rows_without_cached_record() {
        let store = seeded().await;
        store
            .insert_row(NodeType::ProcessCreate, "2023-08-06 15:30:00.000")
            .await
            .unwrap();

        let page = fetch_sysmon_data(
            &store,
            &store,
            NodeType::ProcessCreate,
            &EventFilter::between(START, END),
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(page.total_count, 5);
    }

    #[tokio::test]
    async fn window_excludes_outside_rows() {
        let store = seeded().await;
        let page = fetch_sysmon_data(
            &store,
            &store,
            NodeType::ProcessCreate,
            &EventFilter::between("2023-08-06 15:00:01", "2023-08-06 15:00:02"),
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(page.total_count, 2);
    }

    #[tokio::test]
    async fn other_node_types_are_not_returned() {
        let store = seeded().await;
        let page = fetch_sysmon_data(
            &store,
            &store,
            NodeType::NetworkConnection,
            &EventFilter::between(START, END),
            None,
            10,
        )
        .await
        .unwrap();
        assert_eq!(page.total_count, 0);
        assert!(page.node.is_empty());
    }

    #[tokio::test]
    async fn unknown_label_fails() {
        let store = seeded().await;
        let err = fetch_sysmon_data_by_label(
            &store,
            &store,
            "Image loaded",
            &EventFilter::between(START, END),
            None,
            10,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Invalid node type: Image loaded");
    }

    #[tokio::test]
    async fn invalid_window_fails() {
        let store = seeded().await;
        let err = fetch_sysmon_data(
            &store,
            &store,
            NodeType::ProcessCreate,
            &EventFilter::between("soon", END),
            None,
            10,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FetchError::InvalidTime(_)));
    }
}
