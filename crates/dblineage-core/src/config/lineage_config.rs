//! Lineage generation configuration.
//!
//! Two layers: `LineageSettings` is the static `[lineage]` TOML section;
//! `LineageConfig` is what a generation run actually uses, resolved from
//! the runtime control entries on top of those settings.

use serde::{Deserialize, Serialize};

use crate::types::{ConfigEntry, NodeColors};

pub const ETL_FLAG_KEY: &str = "ETL_DB_LINEAGE_FLAG";
pub const COLUMN_COLORS_KEY: &str = "COLUMN_COLORS";
pub const CACHE_TTL_KEY: &str = "LINEAGE_CACHE_TTL";
pub const MAX_DEPTH_KEY: &str = "MAX_HIERARCHY_DEPTH";

/// Upper bound on configurable hierarchy depth.
pub const MAX_ALLOWED_DEPTH: u32 = 64;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LineageSettings {
    /// Extend trees with ETL target tables. Default: false.
    pub etl_enabled: Option<bool>,
    /// Maximum component depth below the root. Default: 10.
    pub max_hierarchy_depth: Option<u32>,
    /// TTL of cached lineage trees. Default: 3600.
    pub cache_ttl_secs: Option<u64>,
    /// Node color overrides.
    pub node_colors: Option<NodeColors>,
}

impl LineageSettings {
    pub fn effective_etl_enabled(&self) -> bool {
        self.etl_enabled.unwrap_or(false)
    }

    pub fn effective_max_hierarchy_depth(&self) -> u32 {
        self.max_hierarchy_depth.unwrap_or(10)
    }

    pub fn effective_cache_ttl_secs(&self) -> u64 {
        self.cache_ttl_secs.unwrap_or(3600)
    }

    pub fn effective_node_colors(&self) -> NodeColors {
        self.node_colors.clone().unwrap_or_default()
    }
}

/// Resolved configuration for one lineage generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageConfig {
    pub etl_enabled: bool,
    pub node_colors: NodeColors,
    pub cache_ttl_secs: u64,
    pub max_hierarchy_depth: u32,
}

impl Default for LineageConfig {
    fn default() -> Self {
        Self::from_settings(&LineageSettings::default())
    }
}

impl LineageConfig {
    pub fn from_settings(settings: &LineageSettings) -> Self {
        Self {
            etl_enabled: settings.effective_etl_enabled(),
            node_colors: settings.effective_node_colors(),
            cache_ttl_secs: settings.effective_cache_ttl_secs(),
            max_hierarchy_depth: settings.effective_max_hierarchy_depth(),
        }
    }

    /// Layer active control entries over the static settings. Inactive
    /// entries are ignored; unparseable values keep the setting's value.
    pub fn resolve(settings: &LineageSettings, entries: &[ConfigEntry]) -> Self {
        let mut config = Self::from_settings(settings);
        for entry in entries.iter().filter(|e| e.is_active) {
            let value = entry.value.trim();
            match entry.key.as_str() {
                ETL_FLAG_KEY => config.etl_enabled = parse_flag(value),
                COLUMN_COLORS_KEY => match serde_json::from_str::<NodeColors>(value) {
                    Ok(colors) => config.node_colors = colors,
                    Err(e) => {
                        tracing::warn!(key = %entry.key, error = %e, "ignoring unparseable node colors")
                    }
                },
                CACHE_TTL_KEY => match value.parse::<u64>() {
                    Ok(ttl) if ttl > 0 => config.cache_ttl_secs = ttl,
                    _ => tracing::warn!(key = %entry.key, value, "ignoring invalid cache ttl"),
                },
                MAX_DEPTH_KEY => match value.parse::<u32>() {
                    Ok(depth) if (1..=MAX_ALLOWED_DEPTH).contains(&depth) => {
                        config.max_hierarchy_depth = depth
                    }
                    _ => tracing::warn!(key = %entry.key, value, "ignoring invalid hierarchy depth"),
                },
                _ => {}
            }
        }
        config
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "y" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, value: &str, is_active: bool) -> ConfigEntry {
        ConfigEntry {
            key: key.to_string(),
            value: value.to_string(),
            is_active,
        }
    }

    #[test]
    fn defaults_without_entries() {
        let config = LineageConfig::resolve(&LineageSettings::default(), &[]);
        assert!(!config.etl_enabled);
        assert_eq!(config.max_hierarchy_depth, 10);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.node_colors, NodeColors::default());
    }

    #[test]
    fn active_entries_override_settings() {
        let entries = vec![
            entry(ETL_FLAG_KEY, "true", true),
            entry(MAX_DEPTH_KEY, "4", true),
            entry(CACHE_TTL_KEY, "60", false),
            entry(COLUMN_COLORS_KEY, r##"{"PROCEDURE":"#111111"}"##, true),
        ];
        let config = LineageConfig::resolve(&LineageSettings::default(), &entries);
        assert!(config.etl_enabled);
        assert_eq!(config.max_hierarchy_depth, 4);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.node_colors.procedure, "#111111");
    }

    #[test]
    fn invalid_values_fall_back() {
        let entries = vec![
            entry(MAX_DEPTH_KEY, "0", true),
            entry(CACHE_TTL_KEY, "soon", true),
            entry(COLUMN_COLORS_KEY, "not json", true),
        ];
        let settings = LineageSettings {
            max_hierarchy_depth: Some(7),
            ..Default::default()
        };
        let config = LineageConfig::resolve(&settings, &entries);
        assert_eq!(config.max_hierarchy_depth, 7);
        assert_eq!(config.cache_ttl_secs, 3600);
        assert_eq!(config.node_colors, NodeColors::default());
    }
}
