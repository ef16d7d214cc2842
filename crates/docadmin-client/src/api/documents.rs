//! Document storage endpoints.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use docadmin_core::result::AppResult;
use docadmin_core::traits::RemoteSearch;
use docadmin_entity::document::{DocumentMetadata, StoredDocument, UploadDocument};

use crate::http::request::encode_segment;
use crate::http::{ApiClient, ApiRequest, Download, FormPart};

#[derive(Debug, Deserialize)]
struct StorageListing {
    #[serde(default)]
    files: Vec<StoredDocument>,
}

#[derive(Debug, Deserialize)]
struct DocumentListing {
    #[serde(default)]
    documents: Vec<DocumentMetadata>,
}

#[derive(Debug, Deserialize)]
struct SearchHits {
    #[serde(default)]
    hits: Vec<DocumentMetadata>,
}

/// Fetcher for `/documents/*`.
#[derive(Debug, Clone)]
pub struct DocumentsApi {
    client: ApiClient,
}

impl DocumentsApi {
    /// Create a fetcher on top of the shared adapter.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// List raw storage objects under `prefix` (server default when `None`).
    pub async fn list_storage(&self, prefix: Option<&str>) -> AppResult<Vec<StoredDocument>> {
        let mut request = ApiRequest::get("/documents/storage");
        if let Some(prefix) = prefix {
            request = request.query("prefix", prefix);
        }
        let listing: StorageListing = self.client.json(request).await?;
        Ok(listing.files)
    }

    /// List processed document metadata.
    pub async fn list(&self) -> AppResult<Vec<DocumentMetadata>> {
        let listing: DocumentListing = self.client.json(ApiRequest::get("/documents/list")).await?;
        Ok(listing.documents)
    }

    /// Upload a file with its form fields. Uses the extended upload timeout.
    pub async fn upload(
        &self,
        form: &UploadDocument,
        data: Bytes,
        content_type: Option<&str>,
    ) -> AppResult<Value> {
        let size = data.len();
        let parts = vec![
            FormPart::File {
                name: "file".to_string(),
                filename: form.filename.clone(),
                content_type: content_type.map(str::to_string),
                data,
            },
            FormPart::text("apartado", form.apartado.clone()),
            FormPart::text("is_public", form.is_public.to_string()),
        ];
        let response = self
            .client
            .json(ApiRequest::post("/documents/upload").multipart(parts))
            .await?;
        info!(filename = %form.filename, size, public = form.is_public, "Document uploaded");
        Ok(response)
    }

    /// Download a stored object by path.
    pub async fn download_by_path(&self, path: &str) -> AppResult<Download> {
        let request = ApiRequest::get("/documents/download_by_path")
            .query("path", path)
            .timeout(self.client.config().upload_timeout());
        self.client.download(request).await
    }

    /// Download a processed document by id.
    pub async fn download(&self, id: &str) -> AppResult<Download> {
        let request = ApiRequest::get(format!("/documents/download/{}", encode_segment(id)))
            .timeout(self.client.config().upload_timeout());
        self.client.download(request).await
    }

    /// Delete a stored object by path.
    pub async fn delete_by_path(&self, path: &str) -> AppResult<Value> {
        let response = self
            .client
            .json(ApiRequest::delete("/documents/delete_by_path").query("path", path))
            .await?;
        info!(path, "Document deleted");
        Ok(response)
    }

    /// Full-text search over processed documents.
    pub async fn search(&self, query: &str) -> AppResult<Vec<DocumentMetadata>> {
        let hits: SearchHits = self
            .client
            .json(ApiRequest::get("/documents/search").query("query", query))
            .await?;
        Ok(hits.hits)
    }

    /// Fetch one document's metadata.
    pub async fn get(&self, id: &str) -> AppResult<DocumentMetadata> {
        self.client
            .json(ApiRequest::get(format!("/documents/{}", encode_segment(id))))
            .await
    }
}

#[async_trait]
impl RemoteSearch<DocumentMetadata> for DocumentsApi {
    async fn search(&self, query: &str) -> AppResult<Vec<DocumentMetadata>> {
        DocumentsApi::search(self, query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::client_for;

    use axum::Router;
    use axum::extract::{Multipart, Query};
    use axum::routing::{get, post};
    use serde_json::json;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_list_storage_passes_prefix() {
        let router = Router::new().route(
            "/documents/storage",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                axum::Json(json!({
                    "files": [{
                        "path": format!("{}a.pdf", q.get("prefix").cloned().unwrap_or_default()),
                        "filename": "a.pdf",
                        "size": 10,
                        "updated": "2025-06-25T10:00:00+00:00",
                        "tipo": "PDF"
                    }]
                }))
            }),
        );
        let api = DocumentsApi::new(client_for(router).await);
        let files = api.list_storage(Some("documents/")).await.unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "documents/a.pdf");
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_fields() {
        let router = Router::new().route(
            "/documents/upload",
            post(|mut multipart: Multipart| async move {
                let mut fields = serde_json::Map::new();
                while let Some(field) = multipart.next_field().await.unwrap() {
                    let name = field.name().unwrap_or_default().to_string();
                    let file_name = field.file_name().map(str::to_string);
                    let bytes = field.bytes().await.unwrap();
                    let value = match file_name {
                        Some(f) => json!({ "filename": f, "len": bytes.len() }),
                        None => json!(String::from_utf8_lossy(&bytes)),
                    };
                    fields.insert(name, value);
                }
                axum::Json(serde_json::Value::Object(fields))
            }),
        );
        let api = DocumentsApi::new(client_for(router).await);
        let form = UploadDocument {
            filename: "acta.pdf".to_string(),
            apartado: "actas".to_string(),
            is_public: true,
        };
        let echoed = api
            .upload(&form, Bytes::from_static(b"%PDF-1.7"), Some("application/pdf"))
            .await
            .unwrap();
        assert_eq!(echoed["file"]["filename"], "acta.pdf");
        assert_eq!(echoed["file"]["len"], 8);
        assert_eq!(echoed["apartado"], "actas");
        assert_eq!(echoed["is_public"], "true");
    }

    #[tokio::test]
    async fn test_search_reads_hits() {
        let router = Router::new().route(
            "/documents/search",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                axum::Json(json!({
                    "hits": [{ "id": "d1", "filename": format!("{}.pdf", q["query"]) }]
                }))
            }),
        );
        let api = DocumentsApi::new(client_for(router).await);
        let hits = RemoteSearch::search(&api, "informe").await.unwrap();
        assert_eq!(hits[0].filename, "informe.pdf");
    }
}
