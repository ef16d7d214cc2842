//! HTTP client adapter.

pub mod client;
pub mod error;
pub mod navigator;
pub mod request;
pub mod response;

pub use client::{ApiClient, ClientEvent};
pub use navigator::{MemoryNavigator, Navigator};
pub use request::{ApiRequest, FormPart, RequestBody};
pub use response::Download;
