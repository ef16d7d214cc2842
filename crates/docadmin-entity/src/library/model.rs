//! Library entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::file_extension;
use crate::time::parse_optional;

/// A document published in the public library (`GET /documents/public`).
///
/// The search index and the local fallback emit slightly different shapes;
/// the aliases accept both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryEntry {
    /// Document identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// File name.
    #[serde(alias = "filename")]
    pub name: String,
    /// Object path in storage.
    #[serde(default, alias = "storage_path")]
    pub path: Option<String>,
    /// Size in bytes.
    #[serde(default, alias = "file_size_bytes")]
    pub size: u64,
    /// File type (extension, with or without the dot).
    #[serde(default, rename = "type", alias = "file_extension")]
    pub kind: Option<String>,
    /// Extracted title.
    #[serde(default)]
    pub title: Option<String>,
    /// Extracted summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Extracted keywords.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Upload instant.
    #[serde(default)]
    pub upload_timestamp: Option<String>,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryEntry {
    /// Title when present, otherwise the file name.
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.name)
    }

    /// Normalized type: lowercase, no leading dot. Falls back to the name's
    /// extension.
    pub fn type_key(&self) -> Option<String> {
        match self.kind.as_deref().map(|k| k.trim_start_matches('.')) {
            Some(k) if !k.is_empty() => Some(k.to_lowercase()),
            _ => file_extension(&self.name),
        }
    }

    /// Parsed upload instant.
    pub fn uploaded_at(&self) -> Option<DateTime<Utc>> {
        parse_optional(self.upload_timestamp.as_deref())
    }
}

/// Envelope returned by the public listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryPage {
    /// Entries on this page.
    #[serde(default)]
    pub hits: Vec<LibraryEntry>,
    /// Estimated total across all pages.
    #[serde(default, rename = "estimatedTotalHits")]
    pub estimated_total_hits: Option<u64>,
    /// Backend that answered (`"local_files"` for the fallback).
    #[serde(default)]
    pub source: Option<String>,
}
