//! Stored documents and their processed metadata.

pub mod category;
pub mod model;

pub use category::DocumentCategory;
pub use model::{DocumentMetadata, StoredDocument, UploadDocument, file_extension};
