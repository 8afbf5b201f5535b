//! Errors surfaced by the instance pool.

use dungeon_core::error::AppError;

/// Error from pool operations.
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// The controller has been shut down and accepts no new launches.
    #[error("Instance pool is closed")]
    Closed,

    /// A runner task ended without producing a duration.
    #[error("Instance runner failed: {0}")]
    Runner(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        let message = err.to_string();
        match err {
            PoolError::Closed => AppError::service_unavailable(message),
            PoolError::Runner(_) => AppError::internal(message),
            PoolError::Internal(inner) => inner,
        }
    }
}
