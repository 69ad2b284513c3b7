//! Column usage tracing errors.

use super::error_code::{self, LineageErrorCode};
use super::StorageError;

/// Per-file tracing failures. Collected into the trace summary; one
/// failing file never aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("Failed to record usages for {path}: {source}")]
    Sink {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("Failed to mark {path} as parsed: {source}")]
    MarkParsed {
        path: String,
        #[source]
        source: StorageError,
    },

    #[error("Trace cancelled")]
    Cancelled,
}

impl LineageErrorCode for TraceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Cancelled => error_code::CANCELLED,
            Self::Sink { source, .. } | Self::MarkParsed { source, .. } => source.error_code(),
        }
    }
}
