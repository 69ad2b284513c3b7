//! column_usages queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::{NewColumnUsage, UsageType};
use rusqlite::{params, params_from_iter, Connection, ToSql};

use super::util::{collect_rows, placeholders, project_params, sql_err};

/// A stored usage row.
#[derive(Debug, Clone)]
pub struct UsageRecord {
    pub id: i64,
    pub column_id: i64,
    pub source_file_id: i64,
    pub line_number: u32,
    pub usage_type: UsageType,
    pub code_snippet: String,
    pub context: String,
}

/// A source file that touches a table or column, with the usage types seen.
#[derive(Debug, Clone)]
pub struct UsageFileRecord {
    pub source_file_id: i64,
    pub path: String,
    pub usage_types: Vec<String>,
    pub usage_count: i64,
}

/// Insert a usage unless the (column, file, line, type) key already exists.
pub fn insert_usage(conn: &Connection, usage: &NewColumnUsage) -> Result<bool, StorageError> {
    let inserted = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO column_usages
                 (column_id, source_file_id, line_number, usage_type, code_snippet, context)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(sql_err)?
        .execute(params![
            usage.column_id,
            usage.source_file_id,
            usage.line_number,
            usage.usage_type.as_str(),
            usage.code_snippet,
            usage.context,
        ])
        .map_err(sql_err)?;
    Ok(inserted > 0)
}

pub fn delete_project_usages(conn: &Connection, project_id: &str) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM column_usages
         WHERE source_file_id IN (SELECT id FROM source_files WHERE project_id = ?1)",
        params![project_id],
    )
    .map_err(sql_err)
}

pub fn usages_for_file(conn: &Connection, source_file_id: i64) -> Result<Vec<UsageRecord>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, column_id, source_file_id, line_number, usage_type, code_snippet, context
             FROM column_usages WHERE source_file_id = ?1
             ORDER BY line_number, column_id, usage_type",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![source_file_id], |row| {
            let usage_type: String = row.get(4)?;
            Ok((
                UsageRecord {
                    id: row.get(0)?,
                    column_id: row.get(1)?,
                    source_file_id: row.get(2)?,
                    line_number: row.get(3)?,
                    usage_type: UsageType::Read,
                    code_snippet: row.get(5)?,
                    context: row.get(6)?,
                },
                usage_type,
            ))
        })
        .map_err(sql_err)?;
    collect_rows(rows)?
        .into_iter()
        .map(|(mut record, usage_type)| {
            record.usage_type = usage_type
                .parse()
                .map_err(|message| StorageError::Serialization { message })?;
            Ok(record)
        })
        .collect()
}

pub fn count_project_usages(conn: &Connection, project_id: &str) -> Result<i64, StorageError> {
    conn.query_row(
        "SELECT COUNT(*) FROM column_usages u
         JOIN source_files f ON f.id = u.source_file_id
         WHERE f.project_id = ?1",
        params![project_id],
        |row| row.get(0),
    )
    .map_err(sql_err)
}

/// Distinct files with usages of `table` (optionally one `column` of it)
/// across a project set, ordered by path.
pub fn usage_files(
    conn: &Connection,
    project_ids: &[String],
    table: &str,
    column: Option<&str>,
) -> Result<Vec<UsageFileRecord>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let n = project_ids.len();
    let column_filter = if column.is_some() {
        format!("AND c.name = ?{}", n + 2)
    } else {
        String::new()
    };
    let sql = format!(
        "SELECT f.id, f.path, GROUP_CONCAT(DISTINCT u.usage_type), COUNT(*)
         FROM column_usages u
         JOIN db_columns c ON c.id = u.column_id
         JOIN db_tables t ON t.id = c.table_id
         JOIN source_files f ON f.id = u.source_file_id
         WHERE t.project_id IN ({}) AND t.name = ?{} {}
         GROUP BY f.id, f.path
         ORDER BY f.path, f.id",
        placeholders(1, n),
        n + 1,
        column_filter
    );
    let mut values = project_params(project_ids);
    values.push(&table as &dyn ToSql);
    if let Some(ref column) = column {
        values.push(column as &dyn ToSql);
    }
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values), |row| {
            let types: Option<String> = row.get(2)?;
            let mut usage_types: Vec<String> = types
                .unwrap_or_default()
                .split(',')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            usage_types.sort();
            Ok(UsageFileRecord {
                source_file_id: row.get(0)?,
                path: row.get(1)?,
                usage_types,
                usage_count: row.get(3)?,
            })
        })
        .map_err(sql_err)?;
    collect_rows(rows)
}
