use dblineage_core::errors::StorageError;
use dblineage_core::traits::SourceStore;
use dblineage_core::types::{ColumnRef, NewSourceFile, SourceFile};

use crate::connection::writer::with_immediate_transaction;
use crate::queries::{schema, source_files, usages};
use crate::DatabaseManager;

impl SourceStore for DatabaseManager {
    fn upsert_source_file(&self, project_id: &str, file: &NewSourceFile) -> Result<i64, StorageError> {
        self.with_writer(|conn| source_files::upsert_source_file(conn, project_id, file))
    }

    fn project_files(&self, project_id: &str) -> Result<Vec<SourceFile>, StorageError> {
        self.with_reader(|conn| source_files::project_files(conn, project_id))
    }

    fn project_columns(&self, project_id: &str) -> Result<Vec<ColumnRef>, StorageError> {
        self.with_reader(|conn| schema::project_columns(conn, project_id))
    }

    fn reset_trace(&self, project_id: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let deleted = usages::delete_project_usages(tx, project_id)?;
                source_files::reset_parsed(tx, project_id)?;
                tracing::debug!(project_id, deleted, "reset trace state");
                Ok(())
            })
        })
    }
}
