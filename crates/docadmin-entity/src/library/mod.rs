//! Public library entries.

pub mod model;

pub use model::{LibraryEntry, LibraryPage};
