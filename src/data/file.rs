use crate::domain::repository::KeyValueStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, trace};

/// Key-value store persisted as a single JSON object on disk. Every write
/// rewrites the whole file, which is fine for a handful of keys.
#[derive(Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl JsonFileStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    #[instrument(skip_all)]
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).with_context(|| {
                    format!("Failed to parse storage file: {}", path.display())
                })?
            }
        } else {
            info!(path = %path.display(), "No storage file found, starting empty");
            BTreeMap::new()
        };
        debug!(path = %path.display(), keys = entries.len(), "Storage file loaded");
        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    async fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .with_context(|| format!("Failed to write storage file: {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("Failed to replace storage file: {}", self.path.display()))?;
        trace!(keys = entries.len(), "Storage file flushed");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.flush(&next).await?;
        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("storage.json"))
            .await
            .unwrap();
        assert!(store.get("users").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("isAuthenticated", "true".to_string()).await.unwrap();
        store.set("userEmail", "a@b.com".to_string()).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert_eq!(
            reopened.get("userEmail").await.unwrap().as_deref(),
            Some("a@b.com")
        );
        assert_eq!(
            reopened.get("isAuthenticated").await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_remove_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("registrationData", "{}".to_string()).await.unwrap();
        store.remove("registrationData").await.unwrap();

        let reopened = JsonFileStore::open(&path).await.unwrap();
        assert!(reopened.get("registrationData").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("profile");
        let path = parent.join("storage.json");

        let store = JsonFileStore::open(&path).await.unwrap();
        store.set("userEmail", "a@b.com".to_string()).await.unwrap();

        // A plain file where the directory was makes every flush fail.
        tokio::fs::remove_dir_all(&parent).await.unwrap();
        tokio::fs::write(&parent, "blocked").await.unwrap();

        assert!(
            store
                .set("isAuthenticated", "true".to_string())
                .await
                .is_err()
        );
        assert!(store.get("isAuthenticated").await.unwrap().is_none());

        assert!(store.remove("userEmail").await.is_err());
        assert_eq!(
            store.get("userEmail").await.unwrap().as_deref(),
            Some("a@b.com")
        );
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        assert!(JsonFileStore::open(&path).await.is_err());
    }
}
