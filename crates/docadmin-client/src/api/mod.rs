//! Per-domain remote collection fetchers.

pub mod audit;
pub mod auth;
pub mod documents;
pub mod library;
pub mod users;

pub use audit::{AuditApi, AuditSink};
pub use auth::AuthApi;
pub use documents::DocumentsApi;
pub use library::LibraryApi;
pub use users::UsersApi;
