//! Public library endpoints.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use docadmin_core::result::AppResult;
use docadmin_core::traits::RemoteSearch;
use docadmin_core::types::PageRequest;
use docadmin_entity::library::{LibraryEntry, LibraryPage};

use crate::http::request::encode_segment;
use crate::http::{ApiClient, ApiRequest};

const INDEX_PATH: &str = "/documents/public";
const LOCAL_PATH: &str = "/documents/public-local";

/// Fetcher for the public library.
#[derive(Debug, Clone)]
pub struct LibraryApi {
    client: ApiClient,
    page_size: u32,
}

impl LibraryApi {
    /// Create a fetcher; `page_size` is used by [`RemoteSearch`].
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        Self { client, page_size }
    }

    /// One page of public documents.
    ///
    /// When the search index fails, the listing is retried against the
    /// server's local-files endpoint. A rejected credential is never retried.
    pub async fn list(&self, page: PageRequest) -> AppResult<Vec<LibraryEntry>> {
        match self.fetch(INDEX_PATH, None, page).await {
            Ok(result) => Ok(result.hits),
            Err(e) if e.is_authorization() => Err(e),
            Err(e) => {
                warn!(error = %e, "Public index unavailable, using local listing");
                Ok(self.fetch(LOCAL_PATH, None, page).await?.hits)
            }
        }
    }

    /// Search public documents.
    pub async fn search(&self, query: &str, page: PageRequest) -> AppResult<LibraryPage> {
        self.fetch(INDEX_PATH, Some(query), page).await
    }

    /// Delete a stored object by path.
    pub async fn delete_by_path(&self, path: &str) -> AppResult<Value> {
        let response = self
            .client
            .json(ApiRequest::delete("/documents/delete_by_path").query("path", path))
            .await?;
        info!(path, "Library document deleted");
        Ok(response)
    }

    /// Delete a processed document by id.
    pub async fn delete_document(&self, id: &str) -> AppResult<Value> {
        let response = self
            .client
            .json(ApiRequest::delete(format!("/documents/{}", encode_segment(id))))
            .await?;
        info!(id, "Library document deleted");
        Ok(response)
    }

    async fn fetch(&self, path: &str, query: Option<&str>, page: PageRequest) -> AppResult<LibraryPage> {
        let mut request = ApiRequest::get(path);
        if let Some(q) = query {
            request = request.query("q", q);
        }
        let request = request
            .query("limit", page.limit)
            .query("offset", page.offset);
        self.client.json(request).await
    }
}

#[async_trait]
impl RemoteSearch<LibraryEntry> for LibraryApi {
    async fn search(&self, query: &str) -> AppResult<Vec<LibraryEntry>> {
        let page = LibraryApi::search(self, query, PageRequest::first(self.page_size)).await?;
        Ok(page.hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;

    use axum::Router;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_list_falls_back_to_local() {
        let router = Router::new()
            .route(
                INDEX_PATH,
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "index down") }),
            )
            .route(
                LOCAL_PATH,
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    axum::Json(json!({
                        "hits": [{ "filename": "plan.pdf", "file_size_bytes": 10 }],
                        "limit": q["limit"].parse::<u32>().unwrap(),
                        "offset": q["offset"].parse::<u32>().unwrap(),
                        "source": "local_files"
                    }))
                }),
            );
        let api = LibraryApi::new(client_for(router).await, 20);
        let entries = api.list(PageRequest::new(20, 40)).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "plan.pdf");
    }

    #[tokio::test]
    async fn test_list_does_not_retry_rejected_credential() {
        let router = Router::new()
            .route(INDEX_PATH, get(|| async { StatusCode::UNAUTHORIZED }))
            .route(
                LOCAL_PATH,
                get(|| async { axum::Json(json!({ "hits": [{ "name": "x.pdf" }] })) }),
            );
        let api = LibraryApi::new(client_for(router).await, 20);
        let err = api.list(PageRequest::default()).await.unwrap_err();
        assert!(err.is_authorization());
    }

    #[tokio::test]
    async fn test_search_sends_query_and_page() {
        let router = Router::new().route(
            INDEX_PATH,
            get(|Query(q): Query<HashMap<String, String>>| async move {
                axum::Json(json!({
                    "hits": [{ "name": format!("{}-{}-{}.pdf", q["q"], q["limit"], q["offset"]) }],
                    "estimatedTotalHits": 1
                }))
            }),
        );
        let api = LibraryApi::new(client_for(router).await, 5);
        let hits = RemoteSearch::search(&api, "plan").await.unwrap();
        assert_eq!(hits[0].name, "plan-5-0.pdf");
    }
}
