//! Fail-open cache front.

use std::sync::Arc;
use std::time::Duration;

use dblineage_core::config::CacheConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::backend::{CacheBackend, NoopBackend};
use super::keys;
use super::moka_backend::MokaBackend;

/// Shared handle over a cache backend. Every operation degrades to a miss or
/// a no-op when the backend fails.
#[derive(Clone)]
pub struct CacheService {
    backend: Arc<dyn CacheBackend>,
    default_ttl: Duration,
}

impl CacheService {
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self { backend, default_ttl }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        let ttl = Duration::from_secs(config.effective_default_ttl_secs());
        if config.effective_enabled() {
            Self::new(Arc::new(MokaBackend::from_config(config)), ttl)
        } else {
            tracing::info!("lineage cache disabled");
            Self::disabled()
        }
    }

    pub fn disabled() -> Self {
        Self::new(Arc::new(NoopBackend), Duration::ZERO)
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache get failed");
                None
            }
        }
    }

    /// Returns whether the value was stored.
    pub fn set_raw(&self, key: &str, value: String, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.backend.set(key, value, ttl) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache set failed");
                false
            }
        }
    }

    /// Cached value, or `None` on a miss, a backend failure, or a payload
    /// that no longer deserializes.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding undecodable cache entry");
                self.delete(key);
                None
            }
        }
    }

    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool {
        match serde_json::to_string(value) {
            Ok(raw) => self.set_raw(key, raw, ttl),
            Err(e) => {
                tracing::warn!(key, error = %e, "cache payload serialization failed");
                false
            }
        }
    }

    pub fn delete(&self, key: &str) -> bool {
        match self.backend.delete(key) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache delete failed");
                false
            }
        }
    }

    pub fn delete_pattern(&self, pattern: &str) -> usize {
        match self.backend.delete_pattern(pattern) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(pattern, error = %e, "cache pattern delete failed");
                0
            }
        }
    }

    /// Drop every cached entry involving `project_id`.
    pub fn invalidate_project(&self, project_id: &str) -> usize {
        let removed: usize = keys::project_patterns(project_id)
            .iter()
            .map(|p| self.delete_pattern(p))
            .sum();
        tracing::debug!(project_id, removed, "invalidated project cache entries");
        removed
    }
}

impl std::fmt::Debug for CacheService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheService")
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dblineage_core::errors::CacheError;

    struct DownBackend;

    impl CacheBackend for DownBackend {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable { message: "connection refused".into() })
        }
        fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable { message: "connection refused".into() })
        }
        fn delete(&self, _key: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable { message: "connection refused".into() })
        }
        fn delete_pattern(&self, _pattern: &str) -> Result<usize, CacheError> {
            Err(CacheError::Unavailable { message: "connection refused".into() })
        }
    }

    #[test]
    fn backend_failures_read_as_misses() {
        let cache = CacheService::new(Arc::new(DownBackend), Duration::from_secs(60));
        assert!(!cache.set_json("tables:p1", &vec![1, 2, 3], None));
        assert_eq!(cache.get_json::<Vec<i32>>("tables:p1"), None);
        assert!(!cache.delete("tables:p1"));
        assert_eq!(cache.invalidate_project("p1"), 0);
    }

    #[test]
    fn json_round_trip_and_invalidation() {
        let cache = CacheService::from_config(&CacheConfig::default());
        assert!(cache.set_json("lineage:p1_p2:orders:ALL", &"tree", None));
        assert!(cache.set_json("tables:p3", &"other", None));
        assert_eq!(cache.get_json::<String>("lineage:p1_p2:orders:ALL").as_deref(), Some("tree"));
        assert_eq!(cache.invalidate_project("p2"), 1);
        assert_eq!(cache.get_json::<String>("lineage:p1_p2:orders:ALL"), None);
        assert!(cache.get_json::<String>("tables:p3").is_some());
    }

    #[test]
    fn wildcard_ids_invalidate_nothing_else() {
        let cache = CacheService::from_config(&CacheConfig::default());
        cache.set_json("lineage:p1:orders:ALL", &"tree", None);
        cache.set_json("tables:p1_p2", &"tables", None);
        assert_eq!(cache.invalidate_project("*"), 0);
        assert_eq!(cache.invalidate_project("p[1"), 0);
        assert!(cache.get_json::<String>("lineage:p1:orders:ALL").is_some());
        assert!(cache.get_json::<String>("tables:p1_p2").is_some());
    }

    #[test]
    fn undecodable_entries_are_dropped() {
        let cache = CacheService::from_config(&CacheConfig::default());
        cache.set_raw("source:1", "not json".into(), None);
        assert_eq!(cache.get_json::<u32>("source:1"), None);
        assert_eq!(cache.get_raw("source:1"), None);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = CacheService::from_config(&CacheConfig {
            enabled: Some(false),
            ..CacheConfig::default()
        });
        cache.set_json("tables:p1", &1, None);
        assert_eq!(cache.get_json::<i32>("tables:p1"), None);
    }
}
