//! Credential persistence.

pub mod store;

pub use store::TokenStore;
