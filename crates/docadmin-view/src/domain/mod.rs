//! [`ViewRecord`](crate::ViewRecord) implementations and statistics for
//! each collection the console shows.

pub mod audit;
pub mod documents;
pub mod library;
pub mod news;
pub mod users;

pub use audit::{AuditFacet, AuditSortKey, AuditStats, audit_stats};
pub use documents::{DocumentFacet, DocumentSortKey, DocumentStats, document_stats};
pub use library::{LibraryFacet, LibrarySortKey, LibraryStats, library_stats};
pub use news::{NewsFacet, NewsSortKey};
pub use users::{UserFacet, UserSortKey, UserStats, user_stats};
