use dblineage_core::errors::StorageError;
use dblineage_core::traits::UsageSink;
use dblineage_core::types::NewColumnUsage;

use crate::queries::{source_files, usages};
use crate::DatabaseManager;

impl UsageSink for DatabaseManager {
    fn record_usage(&self, usage: &NewColumnUsage) -> Result<bool, StorageError> {
        self.with_writer(|conn| usages::insert_usage(conn, usage))
    }

    fn mark_parsed(&self, source_file_id: i64) -> Result<(), StorageError> {
        self.with_writer(|conn| source_files::mark_parsed(conn, source_file_id))
    }
}
