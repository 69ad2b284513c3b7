//! lineage_results queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::{LineageScope, StoredLineage};
use rusqlite::{params, Connection, OptionalExtension};

use super::util::sql_err;

pub fn find_result(conn: &Connection, scope: &LineageScope) -> Result<Option<StoredLineage>, StorageError> {
    conn.query_row(
        "SELECT lineage_json, updated_at FROM lineage_results
         WHERE project_key = ?1 AND table_name = ?2 AND column_key = ?3",
        params![scope.project_key(), scope.table, scope.column_key()],
        |row| {
            Ok(StoredLineage {
                lineage_json: row.get(0)?,
                updated_at: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(sql_err)
}

pub fn upsert_result(conn: &Connection, scope: &LineageScope, lineage_json: &str) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO lineage_results
             (project_key, project_id, table_name, column_name, column_key, lineage_json)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(project_key, table_name, column_key) DO UPDATE SET
             lineage_json = excluded.lineage_json,
             updated_at = unixepoch()",
        params![
            scope.project_key(),
            scope.primary_project().unwrap_or_default(),
            scope.table,
            scope.column,
            scope.column_key(),
            lineage_json,
        ],
    )
    .map_err(sql_err)?;
    Ok(())
}

/// Delete results whose project set contains `project_id`.
pub fn delete_results_for_project(conn: &Connection, project_id: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM lineage_results
         WHERE instr('_' || project_key || '_', '_' || ?1 || '_') > 0",
        params![project_id],
    )
    .map_err(sql_err)
}

pub fn count_results(conn: &Connection) -> Result<i64, StorageError> {
    conn.query_row("SELECT COUNT(*) FROM lineage_results", [], |row| row.get(0))
        .map_err(sql_err)
}
