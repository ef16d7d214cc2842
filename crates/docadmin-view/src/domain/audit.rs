//! Audit log entries.

use std::borrow::Cow;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use docadmin_core::types::SortSpec;
use docadmin_entity::audit::{AuditLogEntry, Severity};

use crate::filter::MatchMode;
use crate::record::{SortValue, ViewRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditFacet {
    EventType,
    Severity,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuditSortKey {
    Timestamp,
    EventType,
    User,
    Severity,
}

fn severity_rank(severity: Severity) -> f64 {
    match severity {
        Severity::Info => 0.0,
        Severity::Warning => 1.0,
        Severity::Error => 2.0,
        Severity::Critical => 3.0,
    }
}

impl ViewRecord for AuditLogEntry {
    type Facet = AuditFacet;
    type SortKey = AuditSortKey;

    fn search_fields(&self) -> Vec<Cow<'_, str>> {
        vec![
            Cow::Borrowed(self.event_type.as_str()),
            Cow::Borrowed(self.user_id.as_deref().unwrap_or_default()),
            Cow::Owned(self.details_json()),
        ]
    }

    fn facet(&self, facet: AuditFacet) -> Option<Cow<'_, str>> {
        match facet {
            AuditFacet::EventType => Some(Cow::Borrowed(self.event_type.as_str())),
            AuditFacet::Severity => self.severity.map(|s| Cow::Borrowed(s.as_str())),
            AuditFacet::User => self.user_id.as_deref().map(Cow::Borrowed),
        }
    }

    fn match_mode(_: AuditFacet) -> MatchMode {
        MatchMode::Exact
    }

    /// Entries without a severity are counted as `INFO`.
    fn facet_bucket(&self, facet: AuditFacet) -> Option<Cow<'_, str>> {
        match facet {
            AuditFacet::Severity => Some(Cow::Borrowed(self.effective_severity().as_str())),
            _ => self.facet(facet),
        }
    }

    fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.occurred_at()
    }

    fn sort_value(&self, key: AuditSortKey) -> SortValue<'_> {
        match key {
            AuditSortKey::Timestamp => SortValue::Date(self.occurred_at()),
            AuditSortKey::EventType => SortValue::Text(Cow::Borrowed(self.event_type.as_str())),
            AuditSortKey::User => SortValue::text(self.user_id.as_deref()),
            AuditSortKey::Severity => SortValue::Number(severity_rank(self.effective_severity())),
        }
    }

    fn default_sort() -> SortSpec<AuditSortKey> {
        SortSpec::desc(AuditSortKey::Timestamp)
    }
}

/// Summary cards for the audit view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditStats {
    pub total: usize,
    pub by_event_type: BTreeMap<String, usize>,
    /// Missing severities are counted as `INFO`.
    pub by_severity: BTreeMap<String, usize>,
}

impl AuditStats {
    /// Entries with the given severity.
    pub fn severity(&self, severity: Severity) -> usize {
        self.by_severity.get(severity.as_str()).copied().unwrap_or(0)
    }
}

pub fn audit_stats(entries: &[AuditLogEntry]) -> AuditStats {
    let mut stats = AuditStats {
        total: entries.len(),
        by_event_type: BTreeMap::new(),
        by_severity: BTreeMap::new(),
    };
    for entry in entries {
        *stats
            .by_event_type
            .entry(entry.event_type.as_str().to_string())
            .or_default() += 1;
        *stats
            .by_severity
            .entry(entry.effective_severity().as_str().to_string())
            .or_default() += 1;
    }
    stats
}
