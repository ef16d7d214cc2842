//! Document models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::DocumentCategory;
use crate::time::parse_optional;

/// A file as listed by the storage browser (`GET /documents/storage`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Full object path inside the storage bucket.
    pub path: String,
    /// Base file name.
    pub filename: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Last modification time as reported by storage.
    #[serde(default)]
    pub updated: Option<String>,
    /// MIME type.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Content category label assigned by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    /// Whether the document is published in the public library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Section the document was filed under at upload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apartado: Option<String>,
    /// Extracted title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Extracted summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StoredDocument {
    /// Lowercase extension without the dot, if the file name has one.
    pub fn extension(&self) -> Option<String> {
        file_extension(&self.filename)
    }

    /// Whether the file name ends with `.{ext}`, ignoring case.
    pub fn has_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.').to_lowercase();
        !ext.is_empty() && self.filename.to_lowercase().ends_with(&format!(".{ext}"))
    }

    /// Content category, preferring the label the API assigned.
    pub fn category(&self) -> DocumentCategory {
        self.tipo
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or_else(|| {
                DocumentCategory::from_extension(self.extension().as_deref().unwrap_or(""))
            })
    }

    /// Parsed modification instant.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_optional(self.updated.as_deref())
    }

    /// Whether the document is visible in the public library.
    pub fn is_public(&self) -> bool {
        self.public
            .or_else(|| self.extra.get("publico").and_then(Value::as_bool))
            .unwrap_or(false)
    }
}

/// Processed document metadata (`GET /documents/list`, `GET /documents/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document identifier.
    pub id: String,
    /// Original file name.
    #[serde(alias = "file_name")]
    pub filename: String,
    /// Extension including the leading dot.
    #[serde(default)]
    pub file_extension: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub file_size_bytes: u64,
    /// MIME type.
    #[serde(default)]
    pub media_type: Option<String>,
    /// Extracted title.
    #[serde(default)]
    pub title: Option<String>,
    /// Extracted summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Extracted keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Document date (`YYYY-MM-DD`).
    #[serde(default)]
    pub date: Option<String>,
    /// Object path in storage.
    #[serde(default)]
    pub storage_path: Option<String>,
    /// Whether the document is public.
    #[serde(default)]
    pub public: bool,
    /// Upload instant.
    #[serde(default)]
    pub upload_timestamp: Option<String>,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentMetadata {
    /// Parsed upload instant.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        parse_optional(self.upload_timestamp.as_deref())
    }
}

/// Fields sent alongside the file on `POST /documents/upload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDocument {
    /// File name reported to the server.
    pub filename: String,
    /// Section to file the document under.
    pub apartado: String,
    /// Publish to the public library.
    pub is_public: bool,
}

/// Lowercase extension of a file name, without the dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> StoredDocument {
        serde_json::from_value(json!({
            "path": "documents/Informe-2025.PDF",
            "filename": "Informe-2025.PDF",
            "size": 2_400_000,
            "updated": "2025-06-25T10:00:00+00:00",
            "content_type": "application/pdf",
            "publico": true,
            "bucket_generation": 7
        }))
        .unwrap()
    }

    #[test]
    fn test_extension_match_ignores_case() {
        let doc = sample();
        assert_eq!(doc.extension().as_deref(), Some("pdf"));
        assert!(doc.has_extension("pdf"));
        assert!(doc.has_extension(".PDF"));
        assert!(!doc.has_extension("docx"));
        assert_eq!(doc.category(), DocumentCategory::Pdf);
    }

    #[test]
    fn test_unknown_fields_round_trip() {
        let doc = sample();
        assert!(doc.is_public());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["bucket_generation"], 7);
        assert_eq!(value["publico"], true);
    }

    #[test]
    fn test_file_extension_edge_cases() {
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".env"), None);
        assert_eq!(file_extension("a.tar.GZ").as_deref(), Some("gz"));
    }

    #[test]
    fn test_metadata_accepts_file_name_alias() {
        let meta: DocumentMetadata = serde_json::from_value(json!({
            "id": "doc_1",
            "file_name": "acta.docx",
            "file_size_bytes": 10,
            "keywords": ["acta"]
        }))
        .unwrap();
        assert_eq!(meta.filename, "acta.docx");
        assert!(!meta.public);
    }
}
