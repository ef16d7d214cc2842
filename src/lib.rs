//! # docadmin
//!
//! Administrative console core for the document management platform.
//!
//! The workspace crates are re-exported here so an embedding front end can
//! depend on a single crate:
//!
//! - [`core`]: configuration, errors, shared traits and sort types
//! - [`entity`]: records exchanged with the remote API
//! - [`client`]: the HTTP adapter, persisted state and fetchers
//! - [`auth`]: credentials, identity providers and the session manager
//! - [`view`]: filtering, sorting, aggregation and debounced search

pub use docadmin_auth as auth;
pub use docadmin_client as client;
pub use docadmin_core as core;
pub use docadmin_entity as entity;
pub use docadmin_view as view;

pub use docadmin_auth::{Session, SessionManager};
pub use docadmin_client::ApiClient;
pub use docadmin_core::{AppError, AppResult};
