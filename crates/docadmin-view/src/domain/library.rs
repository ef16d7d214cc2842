//! Public library entries.

use std::borrow::Cow;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docadmin_core::types::SortSpec;
use docadmin_entity::library::LibraryEntry;

use crate::filter::MatchMode;
use crate::record::{SortValue, ViewRecord};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryFacet {
    /// Normalized file type, e.g. `pdf`.
    Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibrarySortKey {
    Name,
    Title,
    Size,
    Type,
    Uploaded,
}

impl ViewRecord for LibraryEntry {
    type Facet = LibraryFacet;
    type SortKey = LibrarySortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        let mut fields = vec![Cow::Borrowed(self.name.as_str())];
        fields.extend(self.title.as_deref().map(Cow::Borrowed));
        fields.extend(self.summary.as_deref().map(Cow::Borrowed));
        fields.extend(self.keywords.iter().map(|k| Cow::Borrowed(k.as_str())));
        fields
    }

    fn facet(&self, facet: LibraryFacet) -> Option<Cow<'_, str>> {
        match facet {
            LibraryFacet::Type => self.type_key().map(Cow::Owned),
        }
    }

    fn match_mode(_: LibraryFacet) -> MatchMode {
        MatchMode::CaseInsensitive
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.uploaded_at()
    }

    fn sort_value(&self, key: LibrarySortKey) -> SortValue<'_> {
        match key {
            LibrarySortKey::Name => SortValue::Text(Cow::Borrowed(self.name.as_str())),
            LibrarySortKey::Title => SortValue::Text(Cow::Borrowed(self.display_title())),
            LibrarySortKey::Size => SortValue::Number(self.size as f64),
            LibrarySortKey::Type => SortValue::Text(Cow::Owned(self.type_key().unwrap_or_default())),
            LibrarySortKey::Uploaded => SortValue::Date(self.uploaded_at()),
        }
    }

    fn size_bytes(&self) -> u64 {
        self.size
    }

    fn default_sort() -> SortSpec<LibrarySortKey> {
        SortSpec::asc(LibrarySortKey::Name)
    }
}

/// Summary cards for the library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LibraryStats {
    pub total: usize,
    /// Total size in MiB.
    pub total_size_mb: f64,
    /// Number of distinct file types.
    pub unique_types: usize,
}

pub fn library_stats(entries: &[LibraryEntry]) -> LibraryStats {
    let total_bytes: u64 = entries.iter().map(|e| e.size).sum();
    let types: BTreeSet<String> = entries.iter().filter_map(LibraryEntry::type_key).collect();
    LibraryStats {
        total: entries.len(),
        total_size_mb: total_bytes as f64 / BYTES_PER_MB,
        unique_types: types.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::filter::FilterState;

    fn entries() -> Vec<LibraryEntry> {
        serde_json::from_value(serde_json::json!([
            {"name": "reglamento.pdf", "size": 1048576, "type": "pdf",
             "title": "Reglamento interno", "keywords": ["normativa", "personal"]},
            {"filename": "Plan-Anual.DOCX", "file_size_bytes": 524288, "file_extension": ".docx",
             "summary": "Plan de trabajo anual"},
            {"name": "anexo.pdf", "size": 524288}
        ]))
        .unwrap()
    }

    fn names(entries: &[LibraryEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_query_reaches_keywords_and_summary() {
        let mut filter = FilterState::<LibraryEntry>::new();
        filter.set_query("NORMATIVA");
        assert_eq!(names(&derive(&entries(), &filter)), vec!["reglamento.pdf"]);

        filter.set_query("trabajo");
        assert_eq!(names(&derive(&entries(), &filter)), vec!["Plan-Anual.DOCX"]);
    }

    #[test]
    fn test_type_selector_uses_normalized_type() {
        let mut filter = FilterState::<LibraryEntry>::new();
        filter.select(LibraryFacet::Type, "PDF");
        assert_eq!(
            names(&derive(&entries(), &filter)),
            vec!["anexo.pdf", "reglamento.pdf"]
        );
    }

    #[test]
    fn test_stats() {
        let stats = library_stats(&entries());
        assert_eq!(stats.total, 3);
        assert!((stats.total_size_mb - 2.0).abs() < f64::EPSILON);
        assert_eq!(stats.unique_types, 2);
    }
}
