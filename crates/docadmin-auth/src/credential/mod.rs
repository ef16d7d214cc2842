//! Bearer credentials and their claims.

pub mod claims;
pub mod model;

pub use claims::{TokenClaims, decode_claims};
pub use model::Credential;
