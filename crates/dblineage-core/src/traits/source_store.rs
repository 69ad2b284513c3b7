//! Ingested source files and the columns they are traced against.

use crate::errors::StorageError;
use crate::types::{ColumnRef, NewSourceFile, SourceFile};

pub trait SourceStore {
    /// Store a file. Re-storing an existing path replaces its content and
    /// clears the parsed flag only if the content changed. Returns the file id.
    fn upsert_source_file(&self, project_id: &str, file: &NewSourceFile)
        -> Result<i64, StorageError>;

    fn project_files(&self, project_id: &str) -> Result<Vec<SourceFile>, StorageError>;

    fn project_columns(&self, project_id: &str) -> Result<Vec<ColumnRef>, StorageError>;

    /// Delete the project's usages and clear every parsed flag.
    fn reset_trace(&self, project_id: &str) -> Result<(), StorageError>;
}
