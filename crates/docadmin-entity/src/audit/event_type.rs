//! Audit event type catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of an audit event.
///
/// The server emits additional internal types (e.g. `AUDIT_LOGS_QUERIED`);
/// they are carried verbatim in [`AuditEventType::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuditEventType {
    /// Sign-in, sign-up and sign-out.
    Authentication,
    /// A document was uploaded.
    DocumentUpload,
    /// A document was viewed or downloaded.
    DocumentAccess,
    /// A search was run.
    Search,
    /// An administrative change.
    AdminAction,
    /// An unexpected server-side failure.
    SystemError,
    /// A security-relevant occurrence.
    SecurityEvent,
    /// Profile changes made by the signed-in user.
    UserProfile,
    /// Any other type.
    Other(String),
}

impl AuditEventType {
    /// The catalog shown in the event type selector.
    pub const CATALOG: [Self; 7] = [
        Self::Authentication,
        Self::DocumentUpload,
        Self::DocumentAccess,
        Self::Search,
        Self::AdminAction,
        Self::SystemError,
        Self::SecurityEvent,
    ];

    /// Wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Authentication => "AUTHENTICATION",
            Self::DocumentUpload => "DOCUMENT_UPLOAD",
            Self::DocumentAccess => "DOCUMENT_ACCESS",
            Self::Search => "SEARCH",
            Self::AdminAction => "ADMIN_ACTION",
            Self::SystemError => "SYSTEM_ERROR",
            Self::SecurityEvent => "SECURITY_EVENT",
            Self::UserProfile => "USER_PROFILE",
            Self::Other(raw) => raw,
        }
    }

    /// Human-readable label. Unknown types are labelled with their wire name.
    pub fn label(&self) -> &str {
        match self {
            Self::Authentication => "Authentication",
            Self::DocumentUpload => "Document upload",
            Self::DocumentAccess => "Document access",
            Self::Search => "Search",
            Self::AdminAction => "Administrative action",
            Self::SystemError => "System error",
            Self::SecurityEvent => "Security event",
            Self::UserProfile => "User profile",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for AuditEventType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "AUTHENTICATION" => Self::Authentication,
            "DOCUMENT_UPLOAD" => Self::DocumentUpload,
            "DOCUMENT_ACCESS" => Self::DocumentAccess,
            "SEARCH" => Self::Search,
            "ADMIN_ACTION" => Self::AdminAction,
            "SYSTEM_ERROR" => Self::SystemError,
            "SECURITY_EVENT" => Self::SecurityEvent,
            "USER_PROFILE" => Self::UserProfile,
            _ => Self::Other(raw),
        }
    }
}

impl From<&str> for AuditEventType {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<AuditEventType> for String {
    fn from(event_type: AuditEventType) -> Self {
        event_type.as_str().to_string()
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
