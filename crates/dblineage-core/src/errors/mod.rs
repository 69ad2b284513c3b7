//! Error handling for the lineage engine.
//! One error enum per subsystem, `thiserror` only.

pub mod cache_error;
pub mod config_error;
pub mod error_code;
pub mod lineage_error;
pub mod pipeline_error;
pub mod registry_error;
pub mod storage_error;
pub mod trace_error;

pub use cache_error::CacheError;
pub use config_error::ConfigError;
pub use error_code::LineageErrorCode;
pub use lineage_error::LineageError;
pub use pipeline_error::{PipelineError, PipelineResult};
pub use registry_error::RegistryError;
pub use storage_error::StorageError;
pub use trace_error::TraceError;
