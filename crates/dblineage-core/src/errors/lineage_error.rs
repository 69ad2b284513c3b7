//! Lineage generation errors.

use super::error_code::{self, LineageErrorCode};
use super::StorageError;

/// Errors raised by lineage tree generation. These are recorded on the
/// report row and then returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum LineageError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid lineage request: {0}")]
    InvalidRequest(String),

    #[error("Failed to serialize lineage tree: {message}")]
    Serialization { message: String },
}

impl LineageErrorCode for LineageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Storage(e) => e.error_code(),
            Self::InvalidRequest(_) => error_code::INVALID_REQUEST,
            Self::Serialization { .. } => error_code::LINEAGE_ERROR,
        }
    }
}
