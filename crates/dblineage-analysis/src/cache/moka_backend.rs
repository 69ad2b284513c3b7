//! In-process cache backed by `moka`, with a TTL per entry.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dblineage_core::config::CacheConfig;
use dblineage_core::errors::CacheError;
use moka::sync::Cache;
use moka::Expiry;

use super::backend::CacheBackend;

#[derive(Debug, Clone)]
struct Entry {
    payload: Arc<str>,
    ttl: Duration,
}

/// Expires each entry after the TTL it was stored with.
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct MokaBackend {
    cache: Cache<String, Entry>,
}

impl MokaBackend {
    pub fn new(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryTtl)
            .build();
        Self { cache }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.effective_max_capacity())
    }

    /// Number of live entries after pending maintenance has run.
    pub fn entry_count(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }
}

impl CacheBackend for MokaBackend {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.cache.get(key).map(|e| e.payload.to_string()))
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.cache.insert(
            key.to_string(),
            Entry {
                payload: Arc::from(value),
                ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.cache.invalidate(key);
        Ok(())
    }

    fn delete_pattern(&self, pattern: &str) -> Result<usize, CacheError> {
        let matcher = glob::Pattern::new(pattern).map_err(|e| CacheError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        self.cache.run_pending_tasks();
        let doomed: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| matcher.matches(k.as_str()))
            .map(|(k, _)| k.as_ref().clone())
            .collect();
        for key in &doomed {
            self.cache.invalidate(key);
        }
        Ok(doomed.len())
    }
}
