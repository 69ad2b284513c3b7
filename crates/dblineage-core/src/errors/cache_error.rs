//! Cache backend errors. Never surfaced to callers of the lineage
//! service; the cache wrapper downgrades them to misses.

use super::error_code::{self, LineageErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend unavailable: {message}")]
    Unavailable { message: String },

    #[error("Invalid cache key pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Cache payload could not be (de)serialized: {message}")]
    Serialization { message: String },
}

impl LineageErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        error_code::CACHE_ERROR
    }
}
