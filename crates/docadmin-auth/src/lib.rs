//! # docadmin-auth
//!
//! Authentication and credential lifecycle for the DocAdmin console.
//!
//! ## Modules
//!
//! - `credential`: bearer token, expiry instant, and decoded JWT claims
//! - `token`: persistence of the current credential
//! - `provider`: identity provider abstraction, error table, and the
//!   Identity Toolkit / Secure Token REST implementation
//! - `session`: session manager, expiry monitor, and session-change listener

pub mod credential;
pub mod provider;
pub mod session;
pub mod token;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use credential::{Credential, TokenClaims};
pub use provider::{
    FirebaseIdentityProvider, IdentityProvider, ProfileUpdate, ProviderError, ProviderUser,
};
pub use session::{Session, SessionManager, SignupProfile};
pub use token::TokenStore;
