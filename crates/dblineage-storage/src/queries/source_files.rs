//! source_files queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::{Language, NewSourceFile, SourceFile};
use rusqlite::{params, Connection, OptionalExtension};

use super::util::{collect_rows, sql_err};

/// Insert or refresh a file. The parsed flag survives only if the content
/// is unchanged.
pub fn upsert_source_file(
    conn: &Connection,
    project_id: &str,
    file: &NewSourceFile,
) -> Result<i64, StorageError> {
    conn.query_row(
        "INSERT INTO source_files (project_id, path, language, content)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(project_id, path) DO UPDATE SET
             language = excluded.language,
             parsed = CASE WHEN source_files.content = excluded.content
                           THEN source_files.parsed ELSE 0 END,
             content = excluded.content
         RETURNING id",
        params![project_id, file.path, file.language.name(), file.content],
        |row| row.get(0),
    )
    .map_err(sql_err)
}

pub fn project_files(conn: &Connection, project_id: &str) -> Result<Vec<SourceFile>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, project_id, path, language, content, parsed
             FROM source_files WHERE project_id = ?1 ORDER BY path",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![project_id], row_to_file)
        .map_err(sql_err)?;
    collect_rows(rows)
}

pub fn get_source_file(conn: &Connection, id: i64) -> Result<Option<SourceFile>, StorageError> {
    conn.query_row(
        "SELECT id, project_id, path, language, content, parsed
         FROM source_files WHERE id = ?1",
        params![id],
        row_to_file,
    )
    .optional()
    .map_err(sql_err)
}

pub fn mark_parsed(conn: &Connection, id: i64) -> Result<(), StorageError> {
    let changed = conn
        .execute("UPDATE source_files SET parsed = 1 WHERE id = ?1", params![id])
        .map_err(sql_err)?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "source file".to_string(),
            id: id.to_string(),
        });
    }
    Ok(())
}

pub fn reset_parsed(conn: &Connection, project_id: &str) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE source_files SET parsed = 0 WHERE project_id = ?1",
        params![project_id],
    )
    .map_err(sql_err)
}

fn row_to_file(row: &rusqlite::Row<'_>) -> rusqlite::Result<SourceFile> {
    let language: String = row.get(3)?;
    Ok(SourceFile {
        id: row.get(0)?,
        project_id: row.get(1)?,
        path: row.get(2)?,
        language: language.parse().unwrap_or(Language::Unknown),
        content: row.get(4)?,
        parsed: row.get(5)?,
    })
}
