//! In-memory key/value store.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use docadmin_core::result::AppResult;
use docadmin_core::traits::KeyValueStore;

/// Process-local store backed by a concurrent map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn clear(&self) -> AppResult<()> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::keys;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set(keys::ID_TOKEN, "tok").await.unwrap();
        assert_eq!(store.get(keys::ID_TOKEN).await.unwrap().as_deref(), Some("tok"));
        store.remove(keys::ID_TOKEN).await.unwrap();
        assert!(store.get(keys::ID_TOKEN).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_many_leaves_other_keys() {
        let store = MemoryStore::new();
        for key in keys::SESSION_KEYS {
            store.set(key, "x").await.unwrap();
        }
        store.set("theme", "dark").await.unwrap();
        store.remove_many(&keys::SESSION_KEYS).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = MemoryStore::new();
        store
            .set_json(keys::USER_CLAIMS, &serde_json::json!({ "admin": true }))
            .await
            .unwrap();
        let claims: serde_json::Value = store.get_json(keys::USER_CLAIMS).await.unwrap().unwrap();
        assert_eq!(claims["admin"], true);
    }
}
