//! Convenience result type alias for FileForge.

use crate::error::AppError;

/// A specialized `Result` type for FileForge operations.
pub type AppResult<T> = Result<T, AppError>;
