//! # docadmin-client
//!
//! The console's single outbound gateway to the remote API.
//!
//! - [`ApiClient`] attaches the current credential to every request, picks
//!   the timeout, and tears the local session down on any HTTP 401.
//! - [`state`] holds the key/value stores that persist session state.
//! - [`api`] contains the per-domain fetchers (documents, library, users,
//!   audit, auth) built on top of the client.

pub mod api;
pub mod http;
pub mod state;

pub use api::{AuditApi, AuditSink, AuthApi, DocumentsApi, LibraryApi, UsersApi};
pub use http::{ApiClient, ApiRequest, ClientEvent, Download, MemoryNavigator, Navigator};

/// User agent sent with every request and recorded in audit details.
pub const USER_AGENT: &str = concat!("docadmin/", env!("CARGO_PKG_VERSION"));
