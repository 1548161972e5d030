//! Key assignment and writes to both stores.

use elarocks_db::{DragonflyPool, EventIndexStore};
use elarocks_types::{IndexRow, NodeType, SavedTimeAllocator, SysmonEvent};
use uuid::Uuid;

use crate::error::IngestError;
use crate::parse::ParsedEvent;

/// Records and index rows ready to be written.
#[derive(Debug, Default)]
pub struct KeyedBatch {
    /// `(cache key, record)` pairs.
    pub records: Vec<(String, SysmonEvent)>,
    /// One index row per record, in the same order.
    pub rows: Vec<IndexRow>,
}

impl KeyedBatch {
    /// Number of records in the batch.
    pub const fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the batch holds no records.
    pub const fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Give every event a `savedtime` key.
///
/// Events are ordered by time first (stable, so same-millisecond events
/// keep their search order) and the counter restarts at every new
/// millisecond.
pub fn assign_keys(node_type: NodeType, mut events: Vec<ParsedEvent>) -> KeyedBatch {
    events.sort_by_key(|parsed| parsed.time);

    let mut allocator = SavedTimeAllocator::new();
    let mut batch = KeyedBatch {
        records: Vec::with_capacity(events.len()),
        rows: Vec::with_capacity(events.len()),
    };

    for parsed in events {
        let saved = allocator.allocate(parsed.time);
        let row = IndexRow {
            node_type,
            savedtime: saved.fragment(),
            savedtime_epoch: saved.epoch_millis(),
        };
        batch.records.push((row.cache_key(), parsed.event));
        batch.rows.push(row);
    }

    batch
}

/// Write the records to `Dragonfly`, then their rows to `PostgreSQL`.
///
/// Records go first so every committed row points at a record. Returns
/// the number of rows newly inserted; re-ingesting the same window
/// overwrites records and inserts no rows.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if either write fails.
pub async fn persist(
    cache: &DragonflyPool,
    index: &EventIndexStore<'_>,
    batch: &KeyedBatch,
    ingest_run: Uuid,
) -> Result<u64, IngestError> {
    if batch.is_empty() {
        return Ok(0);
    }

    cache.mset_json(&batch.records).await?;
    let inserted = index.batch_insert(&batch.rows, Some(ingest_run)).await?;

    tracing::debug!(
        records = batch.len(),
        inserted,
        %ingest_run,
        "Persisted batch"
    );
    Ok(inserted)
}
