//! Cache configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the in-process cache. Default: true.
    pub enabled: Option<bool>,
    /// Maximum number of cached entries. Default: 10_000.
    pub max_capacity: Option<u64>,
    /// TTL for entries without a more specific TTL. Default: 3600.
    pub default_ttl_secs: Option<u64>,
    /// TTL of the resolved runtime lineage config. Default: 300.
    pub config_ttl_secs: Option<u64>,
    /// TTL of component source snippets. Default: 3600.
    pub source_ttl_secs: Option<u64>,
}

impl CacheConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    pub fn effective_max_capacity(&self) -> u64 {
        self.max_capacity.unwrap_or(10_000)
    }

    pub fn effective_default_ttl_secs(&self) -> u64 {
        self.default_ttl_secs.unwrap_or(3600)
    }

    pub fn effective_config_ttl_secs(&self) -> u64 {
        self.config_ttl_secs.unwrap_or(300)
    }

    pub fn effective_source_ttl_secs(&self) -> u64 {
        self.source_ttl_secs.unwrap_or(3600)
    }
}
