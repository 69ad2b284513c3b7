//! Tests for layered configuration loading.

use std::sync::Mutex;

use dblineage_core::config::{ConfigOverrides, DbLineageConfig};
use dblineage_core::errors::ConfigError;

/// Serializes tests that touch process environment.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn defaults_are_applied_when_nothing_is_set() {
    let config = DbLineageConfig::default();
    assert_eq!(config.trace.effective_context_radius(), 5);
    assert_eq!(config.trace.effective_snippet_radius(), 2);
    assert_eq!(config.trace.effective_min_match_len(), 4);
    assert_eq!(config.lineage.effective_max_hierarchy_depth(), 10);
    assert_eq!(config.cache.effective_config_ttl_secs(), 300);
    assert!(config.cache.effective_enabled());
    assert!(!config.lineage.effective_etl_enabled());
}

#[test]
fn parses_toml_sections() {
    let config = DbLineageConfig::from_toml(
        r##"
        [trace]
        context_radius = 8
        parallel = false

        [lineage]
        max_hierarchy_depth = 4
        etl_enabled = true

        [lineage.node_colors]
        TABLE = "#000000"

        [cache]
        max_capacity = 50

        [orm]
        custom_descriptors = "orms.toml"
        disabled = ["Knex"]
        "##,
    )
    .unwrap();

    assert_eq!(config.trace.effective_context_radius(), 8);
    assert!(!config.trace.effective_parallel());
    assert_eq!(config.lineage.effective_max_hierarchy_depth(), 4);
    assert_eq!(config.lineage.effective_node_colors().table, "#000000");
    assert_eq!(config.lineage.effective_node_colors().query, "#0a9ccd");
    assert_eq!(config.cache.effective_max_capacity(), 50);
    assert!(config.orm.is_disabled("knex"));
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let err = DbLineageConfig::from_toml("[trace\ncontext_radius = ").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn validation_rejects_out_of_range_depth() {
    let config = DbLineageConfig::from_toml("[lineage]\nmax_hierarchy_depth = 0").unwrap();
    let err = DbLineageConfig::validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "lineage.max_hierarchy_depth"));

    let config = DbLineageConfig::from_toml("[lineage]\nmax_hierarchy_depth = 500").unwrap();
    assert!(DbLineageConfig::validate(&config).is_err());
}

#[test]
fn validation_rejects_snippet_wider_than_context() {
    let config =
        DbLineageConfig::from_toml("[trace]\ncontext_radius = 1\nsnippet_radius = 3").unwrap();
    assert!(DbLineageConfig::validate(&config).is_err());
}

#[test]
fn merge_only_overrides_present_values() {
    let mut base = DbLineageConfig::from_toml("[trace]\ncontext_radius = 7\nsnippet_radius = 1").unwrap();
    let other = DbLineageConfig::from_toml("[trace]\nsnippet_radius = 3").unwrap();
    DbLineageConfig::merge(&mut base, &other);
    assert_eq!(base.trace.context_radius, Some(7));
    assert_eq!(base.trace.snippet_radius, Some(3));
}

#[test]
fn project_file_env_and_overrides_layer_in_order() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("dblineage.toml"),
        "[lineage]\nmax_hierarchy_depth = 6\ncache_ttl_secs = 120\n",
    )
    .unwrap();

    std::env::set_var("DBLINEAGE_CACHE_TTL", "240");
    let overrides = ConfigOverrides {
        max_hierarchy_depth: Some(3),
        ..Default::default()
    };
    let config = DbLineageConfig::load(dir.path(), Some(&overrides));
    std::env::remove_var("DBLINEAGE_CACHE_TTL");

    let config = config.unwrap();
    assert_eq!(config.lineage.max_hierarchy_depth, Some(3));
    assert_eq!(config.lineage.cache_ttl_secs, Some(240));
}

#[test]
fn broken_project_file_fails_loading() {
    let _lock = ENV_MUTEX.lock().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("dblineage.toml"), "[lineage\n").unwrap();
    assert!(DbLineageConfig::load(dir.path(), None).is_err());
}

#[test]
fn to_toml_round_trips_set_values() {
    let config = DbLineageConfig::from_toml("[cache]\ndefault_ttl_secs = 99").unwrap();
    let text = config.to_toml().unwrap();
    let back = DbLineageConfig::from_toml(&text).unwrap();
    assert_eq!(back.cache.default_ttl_secs, Some(99));
}
