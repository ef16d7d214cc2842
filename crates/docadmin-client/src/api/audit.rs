//! Audit trail endpoints.

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use docadmin_core::result::AppResult;
use docadmin_entity::audit::{AuditEventType, AuditLogQuery, AuditLogsPage, NewAuditEvent, Severity};

use crate::http::{ApiClient, ApiRequest};

/// Destination for audit events emitted by the console itself.
#[async_trait]
pub trait AuditSink: Send + Sync + 'static {
    /// Record an event. Callers treat failures as non-fatal.
    async fn record(&self, event: NewAuditEvent) -> AppResult<()>;
}

/// Fetcher for `/audit/*`.
#[derive(Debug, Clone)]
pub struct AuditApi {
    client: ApiClient,
}

impl AuditApi {
    /// Create a fetcher on top of the shared adapter.
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Post an event. Details are enriched with the client timestamp,
    /// user agent and origin before sending.
    pub async fn log_event(
        &self,
        event_type: impl Into<AuditEventType>,
        details: Map<String, Value>,
        severity: Severity,
    ) -> AppResult<()> {
        let event = NewAuditEvent {
            event_type: event_type.into(),
            details: enrich_details(details),
            severity,
        };
        let _: Value = self
            .client
            .json(ApiRequest::post("/audit/event").json(&event)?)
            .await?;
        debug!(event_type = %event.event_type, severity = %event.severity, "Audit event recorded");
        Ok(())
    }

    /// Fetch audit entries matching `query`.
    pub async fn get_logs(&self, query: &AuditLogQuery) -> AppResult<AuditLogsPage> {
        let request = ApiRequest::get("/audit/logs").query_params(query)?;
        self.client.json(request).await
    }
}

#[async_trait]
impl AuditSink for AuditApi {
    async fn record(&self, event: NewAuditEvent) -> AppResult<()> {
        self.log_event(event.event_type, event.details, event.severity)
            .await
    }
}

/// Add `timestamp`, `userAgent` and `ipAddress` to event details.
/// Caller-supplied values for those keys are overwritten.
pub fn enrich_details(mut details: Map<String, Value>) -> Map<String, Value> {
    details.insert(
        "timestamp".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    details.insert(
        "userAgent".to_string(),
        Value::String(crate::USER_AGENT.to_string()),
    );
    details.insert(
        "ipAddress".to_string(),
        Value::String("client-side".to_string()),
    );
    details
}
