//! Persisted client-side state.
//!
//! Session data survives process restarts through a [`KeyValueStore`]. Two
//! backends are provided: an in-process map for tests and embedding, and a
//! JSON file for the command-line console.
//!
//! [`KeyValueStore`]: docadmin_core::traits::KeyValueStore

pub mod file;
pub mod keys;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
