//! # dblineage-core
//!
//! Foundation crate for the column lineage engine.
//! Errors, configuration, tracing setup, shared types, the naming
//! utility, and the traits other crates implement.

pub mod config;
pub mod errors;
pub mod naming;
pub mod tracing;
pub mod traits;
pub mod types;

pub use config::DbLineageConfig;
pub use errors::{LineageErrorCode, PipelineError, PipelineResult};
