//! Operations on the `event_index` table.
//!
//! The index maps `(node_type, saved_at)` to the `savedtime` fragment of a
//! cached record. Range queries hit the `(node_type, saved_at)` index;
//! inserts are idempotent on the `(node_type, savedtime)` primary key so an
//! ingest run can be repeated safely.

use chrono::{DateTime, Utc};
use elarocks_core::{FetchError, TimeIndex, TimeWindow};
use elarocks_types::{IndexRow, NodeType, UnknownNodeType};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// Default batch size for index inserts.
const DEFAULT_BATCH_SIZE: usize = 500;

/// Operations on the `event_index` table.
#[derive(Debug)]
pub struct EventIndexStore<'a> {
    pool: &'a PgPool,
    batch_size: usize,
}

impl<'a> EventIndexStore<'a> {
    /// Create a store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for inserts.
    #[must_use]
    pub const fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = if size == 0 { 1 } else { size };
        self
    }

    /// Batch-insert index rows, tagging them with the ingest run that
    /// produced them. Rows whose key already exists are left untouched.
    ///
    /// Each batch is one `UNNEST` insert inside its own transaction.
    /// Returns the number of rows actually inserted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::CorruptRow`] if a row's epoch is out of range.
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn batch_insert(
        &self,
        rows: &[IndexRow],
        ingest_run: Option<Uuid>,
    ) -> Result<u64, DbError> {
        let mut inserted: u64 = 0;

        for chunk in rows.chunks(self.batch_size) {
            let len = chunk.len();
            let mut node_types = Vec::with_capacity(len);
            let mut savedtimes = Vec::with_capacity(len);
            let mut saved_ats: Vec<DateTime<Utc>> = Vec::with_capacity(len);
            let mut epochs = Vec::with_capacity(len);

            for row in chunk {
                let saved_at = DateTime::from_timestamp_millis(row.savedtime_epoch)
                    .ok_or_else(|| {
                        DbError::CorruptRow(format!(
                            "epoch {} of {} is out of range",
                            row.savedtime_epoch,
                            row.cache_key()
                        ))
                    })?;
                node_types.push(row.node_type.label().to_owned());
                savedtimes.push(row.savedtime.clone());
                saved_ats.push(saved_at);
                epochs.push(row.savedtime_epoch);
            }

            let mut tx = self.pool.begin().await?;

            let result = sqlx::query(
                r"INSERT INTO event_index (node_type, savedtime, saved_at, savedtime_epoch, ingest_run)
                  SELECT t.*, $5::UUID
                  FROM UNNEST($1::TEXT[], $2::TEXT[], $3::TIMESTAMPTZ[], $4::BIGINT[])
                       AS t(node_type, savedtime, saved_at, savedtime_epoch)
                  ON CONFLICT (node_type, savedtime) DO NOTHING",
            )
            .bind(&node_types)
            .bind(&savedtimes)
            .bind(&saved_ats)
            .bind(&epochs)
            .bind(ingest_run)
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            inserted = inserted.saturating_add(result.rows_affected());
        }

        tracing::debug!(
            rows = rows.len(),
            inserted,
            "Inserted index rows (batch UNNEST)"
        );
        Ok(inserted)
    }

    /// All rows of `node_type` with `saved_at` in `[start, end]`, oldest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    /// Returns [`DbError::CorruptRow`] if a stored node type is not served.
    pub async fn fetch_range(
        &self,
        node_type: NodeType,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<IndexRow>, DbError> {
        let rows = sqlx::query_as::<_, EventIndexRow>(
            r"SELECT node_type, savedtime, savedtime_epoch
              FROM event_index
              WHERE node_type = $1 AND saved_at >= $2 AND saved_at <= $3
              ORDER BY saved_at, savedtime",
        )
        .bind(node_type.label())
        .bind(start)
        .bind(end)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(IndexRow::try_from).collect()
    }

    /// Number of rows of `node_type`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn count(&self, node_type: NodeType) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM event_index WHERE node_type = $1")
            .bind(node_type.label())
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

/// A row from the `event_index` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventIndexRow {
    /// Node type label as stored.
    pub node_type: String,
    /// Saved time fragment.
    pub savedtime: String,
    /// Event time in milliseconds since the Unix epoch.
    pub savedtime_epoch: i64,
}

impl TryFrom<EventIndexRow> for IndexRow {
    type Error = DbError;

    fn try_from(row: EventIndexRow) -> Result<Self, Self::Error> {
        let node_type = row
            .node_type
            .parse()
            .map_err(|e: UnknownNodeType| DbError::CorruptRow(e.to_string()))?;
        Ok(Self {
            node_type,
            savedtime: row.savedtime,
            savedtime_epoch: row.savedtime_epoch,
        })
    }
}

impl TimeIndex for PostgresPool {
    async fn fetch_rows(
        &self,
        node_type: NodeType,
        window: &TimeWindow,
    ) -> Result<Vec<IndexRow>, FetchError> {
        EventIndexStore::new(self.pool())
            .fetch_range(node_type, window.start, window.end)
            .await
            .map_err(DbError::into_index_error)
    }
}
