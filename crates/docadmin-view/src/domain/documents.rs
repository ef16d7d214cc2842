//! Stored documents.

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docadmin_core::types::SortSpec;
use docadmin_entity::document::StoredDocument;

use crate::filter::MatchMode;
use crate::record::{SortValue, ViewRecord};

/// Default extension counted by [`document_stats`].
pub const DEFAULT_STAT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFacet {
    /// File extension of the file name.
    Extension,
    /// Content category (`tipo`).
    Category,
    /// `public` or `private`.
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentSortKey {
    Filename,
    Updated,
    Size,
    Category,
}

impl ViewRecord for StoredDocument {
    type Facet = DocumentFacet;
    type SortKey = DocumentSortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![Cow::Borrowed(self.filename.as_str())]
    }

    fn facet(&self, facet: DocumentFacet) -> Option<Cow<'_, str>> {
        match facet {
            DocumentFacet::Extension => Some(Cow::Borrowed(self.filename.as_str())),
            DocumentFacet::Category => Some(match &self.tipo {
                Some(tipo) => Cow::Borrowed(tipo.as_str()),
                None => Cow::Borrowed(self.category().as_str()),
            }),
            DocumentFacet::Visibility => Some(Cow::Borrowed(if self.is_public() {
                "public"
            } else {
                "private"
            })),
        }
    }

    fn match_mode(facet: DocumentFacet) -> MatchMode {
        match facet {
            DocumentFacet::Extension => MatchMode::Extension,
            DocumentFacet::Category => MatchMode::CaseInsensitive,
            DocumentFacet::Visibility => MatchMode::Exact,
        }
    }

    fn facet_bucket(&self, facet: DocumentFacet) -> Option<Cow<'_, str>> {
        match facet {
            DocumentFacet::Extension => self.extension().map(Cow::Owned),
            _ => self.facet(facet),
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.updated_at()
    }

    fn sort_value(&self, key: DocumentSortKey) -> SortValue<'_> {
        match key {
            DocumentSortKey::Filename => SortValue::Text(Cow::Borrowed(self.filename.as_str())),
            DocumentSortKey::Updated => SortValue::Date(self.updated_at()),
            DocumentSortKey::Size => SortValue::Number(self.size as f64),
            DocumentSortKey::Category => SortValue::text(self.tipo.as_deref()),
        }
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }

    fn default_sort() -> SortSpec<DocumentSortKey> {
        SortSpec::desc(DocumentSortKey::Updated)
    }
}

/// Summary cards for the document listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DocumentStats {
    pub total: usize,
    pub total_size: u64,
    /// Documents whose file name ends in the chosen extension.
    pub extension_count: usize,
}

/// Count documents, their total size, and those with `extension`.
pub fn document_stats(documents: &[StoredDocument], extension: &str) -> DocumentStats {
    DocumentStats {
        total: documents.len(),
        total_size: documents.iter().map(|d| d.size).sum(),
        extension_count: documents
            .iter()
            .filter(|d| d.has_extension(extension))
            .count(),
    }
}
