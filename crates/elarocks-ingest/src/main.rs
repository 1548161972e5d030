//! Ingest binary for elarocks.
//!
//! Pulls Sysmon events out of Winlogbeat indices in Elasticsearch and loads
//! them into the stores the GraphQL server reads:
//!
//! ```text
//! Elasticsearch _search --> parse message --> assign savedtime keys
//!     --> Dragonfly (records) --> PostgreSQL (time index rows)
//! ```
//!
//! One search per configured event code. Every row written by one
//! invocation carries the same `ingest_run` id.

mod error;
mod es;
mod parse;
mod persist;

use elarocks_core::AppConfig;
use elarocks_db::{DragonflyPool, EventIndexStore, PostgresPool};
use elarocks_types::NodeType;
use tracing::info;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::error::IngestError;
use crate::es::SearchClient;
use crate::parse::parse_hits;
use crate::persist::{assign_keys, persist};

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, a store connection, a search, or a
/// write fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration.
    let config = AppConfig::load()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    let es = &config.elasticsearch;
    info!(
        indices = ?es.indices,
        event_codes = ?es.event_codes,
        timestamp_start = es.timestamp_start.as_deref(),
        timestamp_end = es.timestamp_end.as_deref(),
        size = es.size,
        "elarocks-ingest starting"
    );

    // 3. Resolve event codes before touching any store.
    let node_types = es
        .event_codes
        .iter()
        .map(|&code| NodeType::from_event_code(code).ok_or(IngestError::UnsupportedCode(code)))
        .collect::<Result<Vec<_>, _>>()?;

    // 4. Connect to the stores.
    let infra = &config.infrastructure;
    let postgres = PostgresPool::open(infra).await?;
    let dragonfly = DragonflyPool::connect(&infra.dragonfly_url).await?;
    let index = EventIndexStore::new(postgres.pool());

    // 5. Search, parse, and persist each event code.
    let search = SearchClient::new(es)?;
    let ingest_run = Uuid::now_v7();
    info!(url = search.url(), %ingest_run, "Search client ready");

    let mut total: u64 = 0;
    for node_type in node_types {
        let response = search.search(node_type.event_code()).await?;
        let events = parse_hits(node_type, response)?;
        let batch = assign_keys(node_type, events);
        let inserted = persist(&dragonfly, &index, &batch, ingest_run).await?;
        total = total.saturating_add(inserted);

        info!(
            node_type = %node_type,
            records = batch.len(),
            inserted,
            "Event code ingested"
        );
    }

    postgres.close().await;
    info!(inserted = total, %ingest_run, "elarocks-ingest complete");
    Ok(())
}
