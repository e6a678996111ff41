//! Durable device storage.
//!
//! The engine persists tokens and the serialized cart as string-keyed
//! blobs. Everything above this module only sees the [`KeyValueStore`]
//! trait; the backends differ in where the blobs live.

use std::{collections::HashMap, fmt, path::PathBuf};

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::warn;

/// Well-known storage keys.
pub mod keys {
    /// Bearer token attached to authenticated requests.
    pub const ACCESS_TOKEN: &str = "accessToken";

    /// Long-lived token exchanged for fresh access tokens.
    pub const REFRESH_TOKEN: &str = "refreshToken";

    /// JSON-serialized cart snapshot.
    pub const CART: &str = "cart";
}

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage io error")]
    Io(#[from] std::io::Error),

    /// Encoding the store contents failed.
    #[error("storage encoding error")]
    Encode(#[from] serde_json::Error),
}

/// String-keyed blob storage.
#[automock]
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the write does not reach the
    /// backend.
    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing an absent key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the removal does not reach the
    /// backend.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory store, used by tests and as a default backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), value.to_owned());

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.write().await.remove(key);

        Ok(())
    }
}

/// File-backed store holding one JSON object of key/value pairs.
///
/// Writes go to a sibling temp file first and are renamed into place, so
/// a crash mid-write never corrupts the previous snapshot.
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing snapshot.
    ///
    /// A missing file starts an empty store. An unreadable snapshot is
    /// logged and discarded rather than failing the open.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(error) => {
                    warn!(path = %path.display(), %error, "discarding corrupt store snapshot");
                    HashMap::new()
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(error) => return Err(StorageError::Io(error)),
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    async fn flush(&self, entries: &HashMap<String, String>) -> Result<(), StorageError> {
        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");

        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;

        entries.insert(key.to_owned(), value.to_owned());

        self.flush(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;

        entries.remove(key);

        self.flush(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[tokio::test]
    async fn memory_store_round_trip() -> TestResult {
        let store = MemoryStore::new();

        store.put("cart", "{}").await?;

        assert_eq!(store.get("cart").await?.as_deref(), Some("{}"));

        store.remove("cart").await?;

        assert_eq!(store.get("cart").await?, None);

        Ok(())
    }

    #[tokio::test]
    async fn memory_store_remove_absent_key_is_ok() -> TestResult {
        let store = MemoryStore::new();

        store.remove("missing").await?;

        Ok(())
    }

    #[tokio::test]
    async fn file_store_survives_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");

        {
            let store = JsonFileStore::open(&path).await?;
            store.put("accessToken", "token-1").await?;
        }

        let reopened = JsonFileStore::open(&path).await?;

        assert_eq!(
            reopened.get("accessToken").await?.as_deref(),
            Some("token-1")
        );

        Ok(())
    }

    #[tokio::test]
    async fn file_store_discards_corrupt_snapshot() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");

        tokio::fs::write(&path, "not json").await?;

        let store = JsonFileStore::open(&path).await?;

        assert_eq!(store.get("accessToken").await?, None);

        Ok(())
    }
}
