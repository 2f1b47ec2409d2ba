//! Backend-agnostic storage failure surface.

use std::error::Error;
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of the underlying engine.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable summary of the backend failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
