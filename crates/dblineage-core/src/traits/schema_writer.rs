//! Destination for extracted schema.

use crate::errors::StorageError;
use crate::types::ParsedColumn;

pub trait SchemaWriter {
    /// Create the table unless the project already has one with this name.
    /// Returns the new table id, or `None` when the table already existed
    /// (the first writer wins and later definitions are ignored).
    fn insert_table_if_absent(&self, project_id: &str, name: &str)
        -> Result<Option<i64>, StorageError>;

    /// Insert a column of a freshly created table. Duplicate names within a
    /// table are ignored.
    fn insert_column(&self, table_id: i64, column: &ParsedColumn) -> Result<(), StorageError>;
}
