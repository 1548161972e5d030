//! `Dragonfly` (Redis-compatible) record cache.
//!
//! Every Sysmon record is stored once, as a JSON string, under the key
//! `{node_type}_{savedtime}`, e.g.
//! `Process Create_2023-08-06 15:00:00.12300000`. The time index in
//! `PostgreSQL` holds the matching `(node_type, savedtime)` pair.

use elarocks_core::{FetchError, RecordCache};
use fred::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::DbError;

/// Connection handle to a `Dragonfly` instance.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl std::fmt::Debug for DragonflyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyPool").finish_non_exhaustive()
    }
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at `url` (`redis://host:port[/db]`).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Config`] if the URL cannot be parsed.
    /// Returns [`DbError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let config = Config::from_url(url)
            .map_err(|e| DbError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if serialization fails.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json = serde_json::to_string(value)?;
        let _: () = self.client.set(key, json.as_str(), None, None, false).await?;
        Ok(())
    }

    /// Read the JSON value at `key`, or `None` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if the stored value is not valid
    /// JSON for `T`.
    /// Returns [`DbError::Dragonfly`] if the read fails.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let value: Option<String> = self.client.get(key).await?;
        value
            .map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(DbError::from)
    }

    /// Store many JSON values in one `MSET` round-trip.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if any value fails to serialize.
    /// Returns [`DbError::Dragonfly`] if the write fails.
    pub async fn mset_json<T: Serialize>(&self, entries: &[(String, T)]) -> Result<(), DbError> {
        if entries.is_empty() {
            return Ok(());
        }

        let pairs = entries
            .iter()
            .map(|(key, value)| Ok((key.clone(), serde_json::to_string(value)?)))
            .collect::<Result<Vec<(String, String)>, DbError>>()?;

        let _: () = self.client.mset(pairs).await?;
        Ok(())
    }

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), DbError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }

    /// The underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

impl RecordCache for DragonflyPool {
    async fn fetch_record(&self, key: &str) -> Result<Option<serde_json::Value>, FetchError> {
        self.get_json(key)
            .await
            .map_err(DbError::into_cache_error)
    }
}
