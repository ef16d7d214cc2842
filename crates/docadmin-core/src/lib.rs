//! # docadmin-core
//!
//! Core crate for the DocAdmin console. Contains configuration schemas,
//! the unified error system, shared sort/pagination types, and the traits
//! implemented by the client and view crates.
//!
//! This crate has **no** internal dependencies on other DocAdmin crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
