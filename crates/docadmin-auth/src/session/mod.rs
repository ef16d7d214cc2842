//! Session lifecycle.
//!
//! [`SessionManager`] owns the signed-in principal and its credential,
//! keeps the HTTP client's default Authorization header in sync, and runs
//! the expiry monitor while a session is active.

mod listener;
pub mod manager;
pub mod model;
mod monitor;

pub use manager::SessionManager;
pub use model::{Session, SignupProfile};
