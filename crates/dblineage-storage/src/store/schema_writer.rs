use dblineage_core::errors::StorageError;
use dblineage_core::traits::SchemaWriter;
use dblineage_core::types::ParsedColumn;

use crate::queries::schema;
use crate::DatabaseManager;

impl SchemaWriter for DatabaseManager {
    fn insert_table_if_absent(&self, project_id: &str, name: &str) -> Result<Option<i64>, StorageError> {
        self.with_writer(|conn| schema::insert_table_if_absent(conn, project_id, name))
    }

    fn insert_column(&self, table_id: i64, column: &ParsedColumn) -> Result<(), StorageError> {
        self.with_writer(|conn| schema::insert_column(conn, table_id, column).map(|_| ()))
    }
}
