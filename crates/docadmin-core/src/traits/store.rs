//! Persisted client-side state.

use async_trait::async_trait;

use crate::result::AppResult;

/// Key → string store holding the console's persisted session state.
///
/// Values are opaque strings (JSON for structured data). Implementations
/// decide where the data lives: process memory, a file on disk, etc.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug + 'static {
    /// Get a value by key. Returns `None` if the key is absent.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Set a value, replacing any previous one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a single key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;

    /// Remove every key.
    async fn clear(&self) -> AppResult<()>;

    /// Remove several keys at once.
    async fn remove_many(&self, keys: &[&str]) -> AppResult<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Get a typed value by deserializing from JSON.
    async fn get_json<T: serde::de::DeserializeOwned + Send>(
        &self,
        key: &str,
    ) -> AppResult<Option<T>>
    where
        Self: Sized,
    {
        match self.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_str(&value)?)),
            None => Ok(None),
        }
    }

    /// Set a typed value by serializing to JSON.
    async fn set_json<T: serde::Serialize + Send + Sync>(&self, key: &str, value: &T) -> AppResult<()>
    where
        Self: Sized,
    {
        let json = serde_json::to_string(value)?;
        self.set(key, &json).await
    }
}
