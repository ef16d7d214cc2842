//! Audit trail records.

pub mod event_type;
pub mod model;
pub mod severity;

pub use event_type::AuditEventType;
pub use model::{AuditLogEntry, AuditLogQuery, AuditLogsPage, NewAuditEvent};
pub use severity::Severity;
