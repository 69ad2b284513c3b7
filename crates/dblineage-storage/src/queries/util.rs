//! Shared query helpers.

use dblineage_core::errors::StorageError;
use rusqlite::ToSql;

/// Map a rusqlite error into the storage error, recognizing busy databases.
pub fn sql_err(e: rusqlite::Error) -> StorageError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = e {
        if failure.code == rusqlite::ErrorCode::DatabaseBusy {
            return StorageError::DbBusy;
        }
    }
    StorageError::SqliteError {
        message: e.to_string(),
    }
}

/// `?start, ?start+1, ...` for `count` parameters.
pub fn placeholders(start: usize, count: usize) -> String {
    (start..start + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parameters for a project id list, to be extended with trailing values.
pub fn project_params(project_ids: &[String]) -> Vec<&dyn ToSql> {
    project_ids.iter().map(|id| id as &dyn ToSql).collect()
}

pub fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, StorageError> {
    rows.map(|row| row.map_err(sql_err)).collect()
}
