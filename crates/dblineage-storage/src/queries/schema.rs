//! db_tables / db_columns queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::{ColumnInfo, ColumnRef, ParsedColumn, TableOverview};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};

use super::util::{collect_rows, placeholders, project_params, sql_err};

/// Insert a table unless one with the same (case-insensitive) name exists
/// in the project. Returns the new id, or `None` if it already existed.
pub fn insert_table_if_absent(
    conn: &Connection,
    project_id: &str,
    name: &str,
) -> Result<Option<i64>, StorageError> {
    let inserted = conn
        .execute(
            "INSERT INTO db_tables (project_id, name) VALUES (?1, ?2)
             ON CONFLICT(project_id, name) DO NOTHING",
            params![project_id, name],
        )
        .map_err(sql_err)?;
    if inserted == 0 {
        return Ok(None);
    }
    Ok(Some(conn.last_insert_rowid()))
}

pub fn find_table(conn: &Connection, project_id: &str, name: &str) -> Result<Option<i64>, StorageError> {
    conn.query_row(
        "SELECT id FROM db_tables WHERE project_id = ?1 AND name = ?2",
        params![project_id, name],
        |row| row.get(0),
    )
    .optional()
    .map_err(sql_err)
}

/// Insert a column; a duplicate name within the table is ignored.
pub fn insert_column(conn: &Connection, table_id: i64, column: &ParsedColumn) -> Result<bool, StorageError> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO db_columns
                 (table_id, name, data_type, is_primary_key, is_foreign_key,
                  foreign_table, foreign_column)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                table_id,
                column.name,
                column.data_type,
                column.is_primary_key,
                column.is_foreign_key,
                column.foreign_table,
                column.foreign_column,
            ],
        )
        .map_err(sql_err)?;
    Ok(inserted > 0)
}

/// Every column of the project, with its table name.
pub fn project_columns(conn: &Connection, project_id: &str) -> Result<Vec<ColumnRef>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, t.name
             FROM db_columns c JOIN db_tables t ON t.id = c.table_id
             WHERE t.project_id = ?1
             ORDER BY t.name, c.name",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![project_id], |row| {
            Ok(ColumnRef {
                id: row.get(0)?,
                name: row.get(1)?,
                table: row.get(2)?,
            })
        })
        .map_err(sql_err)?;
    collect_rows(rows)
}

/// Columns of one table across a project set, sorted by name.
pub fn table_columns(
    conn: &Connection,
    project_ids: &[String],
    table: &str,
) -> Result<Vec<ColumnInfo>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT c.id, c.name, c.data_type, c.is_primary_key, c.is_foreign_key
         FROM db_columns c JOIN db_tables t ON t.id = c.table_id
         WHERE t.project_id IN ({}) AND t.name = ?{}
         ORDER BY c.name COLLATE NOCASE, c.id",
        placeholders(1, project_ids.len()),
        project_ids.len() + 1
    );
    let mut values = project_params(project_ids);
    values.push(&table as &dyn ToSql);
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values), row_to_column_info)
        .map_err(sql_err)?;
    let mut columns: Vec<ColumnInfo> = Vec::new();
    for column in collect_rows(rows)? {
        if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
            columns.push(column);
        }
    }
    Ok(columns)
}

/// All tables of a project set with their columns, grouped by table name.
pub fn tables_overview(
    conn: &Connection,
    project_ids: &[String],
) -> Result<Vec<TableOverview>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT t.name, c.id, c.name, c.data_type, c.is_primary_key, c.is_foreign_key
         FROM db_tables t JOIN db_columns c ON c.table_id = t.id
         WHERE t.project_id IN ({})
         ORDER BY t.name COLLATE NOCASE, c.name COLLATE NOCASE, c.id",
        placeholders(1, project_ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(project_params(project_ids)), |row| {
            let table: String = row.get(0)?;
            let column = ColumnInfo {
                id: row.get(1)?,
                name: row.get(2)?,
                data_type: row.get(3)?,
                is_primary_key: row.get(4)?,
                is_foreign_key: row.get(5)?,
            };
            Ok((table, column))
        })
        .map_err(sql_err)?;
    Ok(group_by_table(collect_rows(rows)?))
}

/// Fold `(table, column)` rows, already ordered by table, into overviews.
/// The same column seen in several projects is listed once.
pub fn group_by_table(rows: Vec<(String, ColumnInfo)>) -> Vec<TableOverview> {
    let mut tables: Vec<TableOverview> = Vec::new();
    for (table, column) in rows {
        match tables.last_mut() {
            Some(last) if last.table_name.eq_ignore_ascii_case(&table) => {
                if !last.columns.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
                    last.columns.push(column);
                }
            }
            _ => tables.push(TableOverview {
                table_name: table,
                columns: vec![column],
            }),
        }
    }
    tables
}

pub fn count_tables(conn: &Connection, project_id: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM db_tables WHERE project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )
    .map_err(sql_err)
}

fn row_to_column_info(row: &rusqlite::Row<'_>) -> rusqlite::Result<ColumnInfo> {
    Ok(ColumnInfo {
        id: row.get(0)?,
        name: row.get(1)?,
        data_type: row.get(2)?,
        is_primary_key: row.get(3)?,
        is_foreign_key: row.get(4)?,
    })
}
