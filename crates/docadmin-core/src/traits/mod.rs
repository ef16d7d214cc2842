//! Core traits defined in `docadmin-core` and implemented by other crates.

pub mod search;
pub mod store;

pub use search::RemoteSearch;
pub use store::KeyValueStore;
