//! Audit log entry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::event_type::AuditEventType;
use super::severity::Severity;
use crate::time::parse_instant;

/// A recorded audit event (`GET /audit/logs`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Record identifier, when the backend exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// When the event happened.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Acting user.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Event category.
    pub event_type: AuditEventType,
    /// Free-form event details.
    #[serde(default)]
    pub details: Option<Value>,
    /// Severity. Unknown or missing levels read as `None`.
    #[serde(default, deserialize_with = "lenient_severity")]
    pub severity: Option<Severity>,
    /// Fields the console does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AuditLogEntry {
    /// Parsed event instant.
    pub fn occurred_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(parse_instant)
    }

    /// Severity with a missing level counted as `INFO`.
    pub fn effective_severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }

    /// Details serialized as compact JSON (`"null"` when absent).
    pub fn details_json(&self) -> String {
        match &self.details {
            Some(details) => details.to_string(),
            None => "null".to_string(),
        }
    }
}

/// Body of `POST /audit/event`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditEvent {
    /// Event category.
    pub event_type: AuditEventType,
    /// Event details.
    pub details: Map<String, Value>,
    /// Severity.
    pub severity: Severity,
}

impl NewAuditEvent {
    /// Create an `INFO` event with empty details.
    pub fn new(event_type: impl Into<AuditEventType>) -> Self {
        Self {
            event_type: event_type.into(),
            details: Map::new(),
            severity: Severity::Info,
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Add a detail field.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// The `action` detail, if set.
    pub fn action(&self) -> Option<&str> {
        self.details.get("action").and_then(Value::as_str)
    }
}

/// Query parameters of `GET /audit/logs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogQuery {
    /// Maximum number of entries.
    pub limit: u32,
    /// Entries to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    /// Only this event type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    /// Only this user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Only this severity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Lower bound (ISO-8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Upper bound (ISO-8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl Default for AuditLogQuery {
    fn default() -> Self {
        Self {
            limit: 200,
            offset: None,
            event_type: None,
            user_id: None,
            severity: None,
            start_date: None,
            end_date: None,
        }
    }
}

/// Envelope of `GET /audit/logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogsPage {
    /// Entries on this page.
    #[serde(default)]
    pub logs: Vec<AuditLogEntry>,
    /// Total matching entries.
    #[serde(default)]
    pub total_count: Option<u64>,
}

fn lenient_severity<'de, D>(deserializer: D) -> Result<Option<Severity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}
