//! JSON document storage on the local filesystem.
//!
//! Every persisted structure lives in its own document under the data
//! directory; a document is read and fully rewritten on each mutation
//! (last write wins, no locking across processes).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Document key for the per-chat warn counters
pub const WARNS_KEY: &str = "warns";
/// Document key for the bot identity card
pub const BOT_INFO_KEY: &str = "botinfo";

/// Errors produced by the document store
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem read/write failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Document serialization/deserialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Identity card shown by `/start` and `/help`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BotInfo {
    /// Display name of the bot
    pub bot_name: String,
    /// Display name of the bot operator
    pub owner_name: String,
}

impl Default for BotInfo {
    fn default() -> Self {
        Self {
            bot_name: "Warden Bot".to_string(),
            owner_name: "Bot Owner".to_string(),
        }
    }
}

/// Key-value store mapping a document key to `<dir>/<key>.json`
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn new(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn document_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Load a document by key, `None` when it does not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub async fn load_json<T: serde::de::DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, StorageError> {
        match tokio::fs::read(self.document_path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Save a document under a key, replacing any previous content
    ///
    /// The document is written to a `.tmp` sibling and renamed into place
    /// so readers never observe a half-written file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save_json<T: Serialize + Sync>(
        &self,
        key: &str,
        data: &T,
    ) -> Result<(), StorageError> {
        let body = serde_json::to_string_pretty(data)?;
        let path = self.document_path(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, body.as_bytes()).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Delete a document; missing documents are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the removal fails for any reason other than
    /// the file being absent.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.document_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Seed the documents the bot expects to exist on first boot
    ///
    /// # Errors
    ///
    /// Returns an error if a seed document cannot be written.
    pub async fn ensure_defaults(&self) -> Result<(), StorageError> {
        if self
            .load_json::<serde_json::Value>(WARNS_KEY)
            .await
            .unwrap_or(None)
            .is_none()
        {
            self.save_json(WARNS_KEY, &serde_json::json!({})).await?;
            info!("Initialized data document: {WARNS_KEY}");
        }
        if self
            .load_json::<serde_json::Value>(BOT_INFO_KEY)
            .await
            .unwrap_or(None)
            .is_none()
        {
            self.save_json(BOT_INFO_KEY, &BotInfo::default()).await?;
            info!("Initialized data document: {BOT_INFO_KEY}");
        }
        Ok(())
    }

    /// Load the bot identity card, falling back to defaults
    pub async fn bot_info(&self) -> BotInfo {
        self.load_json(BOT_INFO_KEY)
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    async fn temp_store() -> (tempfile::TempDir, JsonFileStore) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = JsonFileStore::new(dir.path()).await.expect("store");
        (dir, store)
    }

    #[tokio::test]
    async fn test_load_absent_returns_none() {
        let (_dir, store) = temp_store().await;
        let loaded: Option<HashMap<String, u32>> =
            store.load_json("missing").await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let (_dir, store) = temp_store().await;
        let mut doc = HashMap::new();
        doc.insert("100".to_string(), 2u32);

        store.save_json("counts", &doc).await.expect("save");
        let loaded: Option<HashMap<String, u32>> =
            store.load_json("counts").await.expect("load");
        assert_eq!(loaded, Some(doc));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (_dir, store) = temp_store().await;
        store.save_json("doc", &1u32).await.expect("save");
        store.save_json("doc", &2u32).await.expect("save");
        let loaded: Option<u32> = store.load_json("doc").await.expect("load");
        assert_eq!(loaded, Some(2));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, store) = temp_store().await;
        store.save_json("doc", &1u32).await.expect("save");
        store.delete("doc").await.expect("delete");
        store.delete("doc").await.expect("delete again");
        let loaded: Option<u32> = store.load_json("doc").await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_ensure_defaults_seeds_documents() {
        let (_dir, store) = temp_store().await;
        store.ensure_defaults().await.expect("seed");

        let warns: Option<serde_json::Value> = store.load_json(WARNS_KEY).await.expect("load");
        assert_eq!(warns, Some(serde_json::json!({})));

        let info = store.bot_info().await;
        assert_eq!(info.owner_name, "Bot Owner");
    }

    #[tokio::test]
    async fn test_ensure_defaults_keeps_existing() {
        let (_dir, store) = temp_store().await;
        let custom = BotInfo {
            bot_name: "Custom".to_string(),
            owner_name: "Me".to_string(),
        };
        store.save_json(BOT_INFO_KEY, &custom).await.expect("save");
        store.ensure_defaults().await.expect("seed");
        assert_eq!(store.bot_info().await.bot_name, "Custom");
    }
}
