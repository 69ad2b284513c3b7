//! Configuration system.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod cache_config;
pub mod dblineage_config;
pub mod lineage_config;
pub mod orm_config;
pub mod trace_config;

pub use cache_config::CacheConfig;
pub use dblineage_config::{ConfigOverrides, DbLineageConfig};
pub use lineage_config::{LineageConfig, LineageSettings};
pub use orm_config::OrmConfig;
pub use trace_config::TraceConfig;
