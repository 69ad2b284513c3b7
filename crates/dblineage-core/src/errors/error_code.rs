//! Stable error codes shared by every error enum.

/// Structured error code for callers that cannot match on Rust enums
/// (HTTP handlers, job runners, report rows).
pub trait LineageErrorCode {
    /// Returns the error code string (e.g., "STORAGE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns `[ERROR_CODE] message`.
    fn code_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const MIGRATION_FAILED: &str = "MIGRATION_FAILED";
pub const DB_BUSY: &str = "DB_BUSY";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CACHE_ERROR: &str = "CACHE_ERROR";
pub const REGISTRY_ERROR: &str = "REGISTRY_ERROR";
pub const TRACE_ERROR: &str = "TRACE_ERROR";
pub const LINEAGE_ERROR: &str = "LINEAGE_ERROR";
pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
pub const PIPELINE_ERROR: &str = "PIPELINE_ERROR";
pub const CANCELLED: &str = "CANCELLED";
