//! In-memory time index and record cache.
//!
//! Backs the test suites and local demos without `PostgreSQL` or
//! `Dragonfly`. Keys and rows are laid out exactly as the live stores lay
//! them out, so queries behave the same against either.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use elarocks_types::{
    IndexRow, NodeType, SavedTimeAllocator, SysmonEvent, parse_utc_time, resolve_type,
};
use tokio::sync::RwLock;

use crate::error::FetchError;
use crate::source::{RecordCache, TimeIndex};
use crate::window::TimeWindow;

/// Length of the `%Y-%m-%d %H:%M:%S%.3f` prefix of a saved time fragment.
const TIME_PREFIX_LEN: usize = 23;

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<IndexRow>,
    records: HashMap<String, serde_json::Value>,
    allocator: SavedTimeAllocator,
}

/// A time index and record cache held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` under an explicit saved time fragment and index it.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidTime`] if `savedtime` does not start
    /// with a `%Y-%m-%d %H:%M:%S%.3f` timestamp.
    pub async fn insert(
        &self,
        node_type: NodeType,
        savedtime: &str,
        payload: serde_json::Value,
    ) -> Result<IndexRow, FetchError> {
        let row = index_row(node_type, savedtime)?;
        let mut inner = self.inner.write().await;
        inner.records.insert(row.cache_key(), payload);
        inner.rows.push(row.clone());
        Ok(row)
    }

    /// Index a row with no cached record behind it.
    ///
    /// # Errors
    ///
    /// As [`MemoryStore::insert`].
    pub async fn insert_row(
        &self,
        node_type: NodeType,
        savedtime: &str,
    ) -> Result<IndexRow, FetchError> {
        let row = index_row(node_type, savedtime)?;
        self.inner.write().await.rows.push(row.clone());
        Ok(row)
    }

    /// Store a raw payload that happened at `time`, picking its node type
    /// from the payload's shape and allocating a fresh saved time.
    pub async fn insert_payload(
        &self,
        payload: serde_json::Value,
        time: DateTime<Utc>,
    ) -> IndexRow {
        let node_type = resolve_type(&payload);
        let mut inner = self.inner.write().await;
        let saved = inner.allocator.allocate(time);
        let row = IndexRow {
            node_type,
            savedtime: saved.fragment(),
            savedtime_epoch: saved.epoch_millis(),
        };
        inner.records.insert(row.cache_key(), payload);
        inner.rows.push(row.clone());
        row
    }

    /// Store a typed event that happened at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Cache`] if the event cannot be serialized.
    pub async fn insert_event(
        &self,
        event: &SysmonEvent,
        time: DateTime<Utc>,
    ) -> Result<IndexRow, FetchError> {
        let payload =
            serde_json::to_value(event).map_err(|e| FetchError::Cache(e.to_string()))?;
        let node_type = event.node_type();
        let mut inner = self.inner.write().await;
        let saved = inner.allocator.allocate(time);
        let row = IndexRow {
            node_type,
            savedtime: saved.fragment(),
            savedtime_epoch: saved.epoch_millis(),
        };
        inner.records.insert(row.cache_key(), payload);
        inner.rows.push(row.clone());
        Ok(row)
    }

    /// Number of indexed rows.
    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    /// Whether nothing has been indexed.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.rows.is_empty()
    }
}

impl TimeIndex for MemoryStore {
    async fn fetch_rows(
        &self,
        node_type: NodeType,
        window: &TimeWindow,
    ) -> Result<Vec<IndexRow>, FetchError> {
        let inner = self.inner.read().await;
        let mut rows: Vec<IndexRow> = inner
            .rows
            .iter()
            .filter(|row| row.node_type == node_type && window.contains_millis(row.savedtime_epoch))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            a.savedtime_epoch
                .cmp(&b.savedtime_epoch)
                .then_with(|| a.savedtime.cmp(&b.savedtime))
        });
        Ok(rows)
    }
}

impl RecordCache for MemoryStore {
    async fn fetch_record(&self, key: &str) -> Result<Option<serde_json::Value>, FetchError> {
        Ok(self.inner.read().await.records.get(key).cloned())
    }
}

fn index_row(node_type: NodeType, savedtime: &str) -> Result<IndexRow, FetchError> {
    let prefix = savedtime.get(..TIME_PREFIX_LEN).unwrap_or(savedtime);
    let time =
        parse_utc_time(prefix).ok_or_else(|| FetchError::InvalidTime(savedtime.to_owned()))?;
    Ok(IndexRow {
        node_type,
        savedtime: savedtime.to_owned(),
        savedtime_epoch: time.timestamp_millis(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use elarocks_types::{DateTimeRange, ProcessCreateEvent};
    use serde_json::json;

    use super::*;

    fn window(start: &str, end: &str) -> TimeWindow {
        TimeWindow::parse(&DateTimeRange {
            start: start.to_owned(),
            end: end.to_owned(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn insert_payload_resolves_type_and_counts_collisions() {
        let store = MemoryStore::new();
        let t = parse_utc_time("2023-08-06 15:00:00.250").unwrap();

        let reg = store
            .insert_payload(json!({"event_type": "SetValue"}), t)
            .await;
        let net = store.insert_payload(json!({"protocol": "tcp"}), t).await;

        assert_eq!(reg.node_type, NodeType::RegistryValueSet);
        assert_eq!(net.node_type, NodeType::NetworkConnection);
        assert_eq!(reg.savedtime, "2023-08-06 15:00:00.25000000");
        assert_eq!(net.savedtime, "2023-08-06 15:00:00.25000001");
        assert_eq!(
            net.cache_key(),
            "Network connection detected_2023-08-06 15:00:00.25000001"
        );
    }

    #[tokio::test]
    async fn typed_events_round_trip_through_cache() {
        let store = MemoryStore::new();
        let event = SysmonEvent::from(ProcessCreateEvent {
            process_id: Some(4242),
            hashes: vec!["SHA1=AA".to_owned(), "MD5=BB".to_owned()],
            ..ProcessCreateEvent::default()
        });
        let row = store
            .insert_event(&event, parse_utc_time("2023-08-06 15:00:00.000").unwrap())
            .await
            .unwrap();

        let payload = store.fetch_record(&row.cache_key()).await.unwrap().unwrap();
        assert_eq!(SysmonEvent::decode(row.node_type, payload).unwrap(), event);
    }

    #[tokio::test]
    async fn fetch_rows_filters_and_sorts() {
        let store = MemoryStore::new();
        store
            .insert_row(NodeType::ProcessCreate, "2023-08-06 15:00:02.00000000")
            .await
            .unwrap();
        store
            .insert_row(NodeType::ProcessCreate, "2023-08-06 15:00:01.00000000")
            .await
            .unwrap();
        store
            .insert_row(NodeType::RegistryValueSet, "2023-08-06 15:00:01.00000000")
            .await
            .unwrap();
        store
            .insert_row(NodeType::ProcessCreate, "2023-08-06 18:00:00.00000000")
            .await
            .unwrap();

        let rows = store
            .fetch_rows(
                NodeType::ProcessCreate,
                &window("2023-08-06 15:00:00", "2023-08-06 16:00:00"),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].savedtime_epoch < rows[1].savedtime_epoch);
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn rejects_malformed_fragment() {
        let store = MemoryStore::new();
        let err = store
            .insert_row(NodeType::ProcessCreate, "not a time")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidTime(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.fetch_record("Process Create_x").await.unwrap(), None);
    }
}
