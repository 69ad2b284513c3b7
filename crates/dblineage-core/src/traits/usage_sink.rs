//! Streaming destination for traced column usages.

use crate::errors::StorageError;
use crate::types::NewColumnUsage;

/// Receives usages as they are found. Implementations must enforce the
/// (column, file, line, usage type) uniqueness key so retracing a file
/// never duplicates rows.
pub trait UsageSink {
    /// Returns true if a new row was stored, false if it already existed.
    fn record_usage(&self, usage: &NewColumnUsage) -> Result<bool, StorageError>;

    /// Flag a file as traced.
    fn mark_parsed(&self, source_file_id: i64) -> Result<(), StorageError>;
}

impl<T: UsageSink + ?Sized> UsageSink for &T {
    fn record_usage(&self, usage: &NewColumnUsage) -> Result<bool, StorageError> {
        (**self).record_usage(usage)
    }

    fn mark_parsed(&self, source_file_id: i64) -> Result<(), StorageError> {
        (**self).mark_parsed(source_file_id)
    }
}
