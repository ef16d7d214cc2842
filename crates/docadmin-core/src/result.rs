//! Convenience result type alias for DocAdmin.

use crate::error::AppError;

/// A specialized `Result` type for DocAdmin operations.
pub type AppResult<T> = Result<T, AppError>;
