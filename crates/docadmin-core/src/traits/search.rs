//! Opaque remote search collaborator.

use async_trait::async_trait;

use crate::result::AppResult;

/// A remote endpoint that answers a free-text query with a list of records.
///
/// The search engine behind it is treated as a black box; callers only
/// see the records it returns.
#[async_trait]
pub trait RemoteSearch<T>: Send + Sync + 'static
where
    T: Send + 'static,
{
    /// Run a query. The query is never empty.
    async fn search(&self, query: &str) -> AppResult<Vec<T>>;
}
