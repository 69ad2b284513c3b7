//! Top-level engine configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::lineage_config::MAX_ALLOWED_DEPTH;
use super::{CacheConfig, LineageSettings, OrmConfig, TraceConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Caller overrides (`ConfigOverrides`)
/// 2. Environment variables (`DBLINEAGE_*`)
/// 3. Project config (`dblineage.toml` in the project root)
/// 4. User config (`~/.dblineage/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DbLineageConfig {
    pub trace: TraceConfig,
    pub lineage: LineageSettings,
    pub cache: CacheConfig,
    pub orm: OrmConfig,
}

/// Programmatic overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_hierarchy_depth: Option<u32>,
    pub etl_enabled: Option<bool>,
    pub cache_enabled: Option<bool>,
    pub trace_parallel: Option<bool>,
    pub custom_descriptors: Option<String>,
}

impl DbLineageConfig {
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_path) = Self::user_config_path() {
            if user_path.exists() {
                match Self::merge_toml_file(&mut config, &user_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(path = %user_path.display(), error = %e, "skipping user config");
                    }
                }
            }
        }

        let project_path = root.join("dblineage.toml");
        if project_path.exists() {
            Self::merge_toml_file(&mut config, &project_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn validate(config: &DbLineageConfig) -> Result<(), ConfigError> {
        if let Some(depth) = config.lineage.max_hierarchy_depth {
            if !(1..=MAX_ALLOWED_DEPTH).contains(&depth) {
                return Err(ConfigError::ValidationFailed {
                    field: "lineage.max_hierarchy_depth".to_string(),
                    message: format!("must be between 1 and {MAX_ALLOWED_DEPTH}"),
                });
            }
        }
        if config.lineage.cache_ttl_secs == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "lineage.cache_ttl_secs".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if config.cache.max_capacity == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "cache.max_capacity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        let trace = &config.trace;
        if trace.effective_min_match_len() < trace.effective_min_variant_len() {
            return Err(ConfigError::ValidationFailed {
                field: "trace.min_match_len".to_string(),
                message: "must not be smaller than trace.min_variant_len".to_string(),
            });
        }
        if trace.effective_snippet_radius() > trace.effective_context_radius() {
            return Err(ConfigError::ValidationFailed {
                field: "trace.snippet_radius".to_string(),
                message: "must not exceed trace.context_radius".to_string(),
            });
        }
        Ok(())
    }

    fn user_config_path() -> Option<PathBuf> {
        home_dir().map(|h| h.join(".dblineage").join("config.toml"))
    }

    /// Merge a TOML file into the existing config. Unknown keys are ignored.
    fn merge_toml_file(config: &mut DbLineageConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let file_config: DbLineageConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    pub fn merge(base: &mut DbLineageConfig, other: &DbLineageConfig) {
        macro_rules! take {
            ($section:ident . $field:ident) => {
                if other.$section.$field.is_some() {
                    base.$section.$field = other.$section.$field.clone();
                }
            };
        }

        take!(trace.context_radius);
        take!(trace.snippet_radius);
        take!(trace.snippet_max_chars);
        take!(trace.context_max_chars);
        take!(trace.min_variant_len);
        take!(trace.min_match_len);
        take!(trace.distinctive_name_len);
        take!(trace.parallel);

        take!(lineage.etl_enabled);
        take!(lineage.max_hierarchy_depth);
        take!(lineage.cache_ttl_secs);
        take!(lineage.node_colors);

        take!(cache.enabled);
        take!(cache.max_capacity);
        take!(cache.default_ttl_secs);
        take!(cache.config_ttl_secs);
        take!(cache.source_ttl_secs);

        take!(orm.custom_descriptors);
        if !other.orm.disabled.is_empty() {
            base.orm.disabled = other.orm.disabled.clone();
        }
    }

    fn apply_env_overrides(config: &mut DbLineageConfig) {
        if let Some(v) = env_parse::<u32>("DBLINEAGE_MAX_DEPTH") {
            config.lineage.max_hierarchy_depth = Some(v);
        }
        if let Some(v) = env_parse::<u64>("DBLINEAGE_CACHE_TTL") {
            config.lineage.cache_ttl_secs = Some(v);
        }
        if let Some(v) = env_parse::<bool>("DBLINEAGE_ETL_ENABLED") {
            config.lineage.etl_enabled = Some(v);
        }
        if let Some(v) = env_parse::<bool>("DBLINEAGE_CACHE_ENABLED") {
            config.cache.enabled = Some(v);
        }
        if let Some(v) = env_parse::<bool>("DBLINEAGE_TRACE_PARALLEL") {
            config.trace.parallel = Some(v);
        }
    }

    fn apply_overrides(config: &mut DbLineageConfig, overrides: &ConfigOverrides) {
        if let Some(v) = overrides.max_hierarchy_depth {
            config.lineage.max_hierarchy_depth = Some(v);
        }
        if let Some(v) = overrides.etl_enabled {
            config.lineage.etl_enabled = Some(v);
        }
        if let Some(v) = overrides.cache_enabled {
            config.cache.enabled = Some(v);
        }
        if let Some(v) = overrides.trace_parallel {
            config.trace.parallel = Some(v);
        }
        if let Some(ref v) = overrides.custom_descriptors {
            config.orm.custom_descriptors = Some(v.clone());
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
