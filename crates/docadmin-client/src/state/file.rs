//! JSON-file key/value store.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use docadmin_core::error::AppError;
use docadmin_core::result::AppResult;
use docadmin_core::traits::KeyValueStore;

/// Store persisted as a flat JSON object on disk.
///
/// The file is read lazily on first access and rewritten in full on every
/// mutation. A missing file is an empty store; a corrupt file is logged and
/// treated as empty so a damaged session never blocks sign-in.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    /// Create a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> AppResult<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(map) => Ok(map),
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Ignoring unreadable state file");
                    Ok(BTreeMap::new())
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::with_source(
                docadmin_core::error::ErrorKind::Storage,
                format!("Failed to read state file {}", self.path.display()),
                e,
            )),
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), keys = entries.len(), "State file written");
        Ok(())
    }

    async fn mutate<F>(&self, apply: F) -> AppResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>) + Send,
    {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        let entries = guard.get_or_insert_with(BTreeMap::new);
        apply(entries);
        self.persist(entries).await
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        Ok(guard.as_ref().and_then(|entries| entries.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.mutate(move |entries| {
            entries.insert(key, value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let key = key.to_string();
        self.mutate(move |entries| {
            entries.remove(&key);
        })
        .await
    }

    async fn clear(&self) -> AppResult<()> {
        self.mutate(|entries| entries.clear()).await
    }

    async fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        self.mutate(move |entries| {
            for key in &keys {
                entries.remove(key);
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store.set("idToken", "abc").await.unwrap();
        store.set("user", "{\"uid\":\"u1\"}").await.unwrap();
        drop(store);

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("idToken").await.unwrap().as_deref(), Some("abc"));
        reopened.clear().await.unwrap();
        assert!(reopened.get("user").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileStore::new(&path);
        assert!(store.get("idToken").await.unwrap().is_none());
        store.set("idToken", "fresh").await.unwrap();
        assert_eq!(store.get("idToken").await.unwrap().as_deref(), Some("fresh"));
    }
}
