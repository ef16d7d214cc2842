//! Console user accounts.

pub mod model;
pub mod role;
pub mod status;

pub use model::{ChangePassword, CurrentUser, User, UserForm};
pub use role::UserRole;
pub use status::UserStatus;
