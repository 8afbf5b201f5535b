//! Convenience result type alias for the dungeon queue.

use crate::error::AppError;

/// A specialized `Result` type for dungeon queue operations.
pub type AppResult<T> = Result<T, AppError>;
