//! Cache backend seam.

use std::time::Duration;

use dblineage_core::errors::CacheError;

/// String-keyed, TTL-bounded storage of serialized payloads.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Delete every key matching a glob pattern. Returns how many were removed.
    fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError>;
}

/// Backend used when caching is disabled. Stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopBackend;

impl CacheBackend for NoopBackend {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }

    fn delete_pattern(&self, _pattern: &str) -> Result<usize, CacheError> {
        Ok(0)
    }
}
