//! projects queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::ProjectSummary;
use rusqlite::{params, Connection};

use super::util::{collect_rows, sql_err};

pub fn upsert_project(conn: &Connection, project: &ProjectSummary) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO projects (id, application_id, name) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET application_id = excluded.application_id,
                                       name = excluded.name",
        params![project.id, project.application_id, project.name],
    )
    .map_err(sql_err)?;
    Ok(())
}

/// Projects of an application that have at least one SQL source file.
pub fn projects_with_sql(
    conn: &Connection,
    application_id: &str,
) -> Result<Vec<ProjectSummary>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT p.id, p.name, p.application_id
             FROM projects p
             WHERE p.application_id = ?1
               AND EXISTS (SELECT 1 FROM source_files f
                           WHERE f.project_id = p.id AND f.language = 'sql')
             ORDER BY p.name, p.id",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map(params![application_id], |row| {
            Ok(ProjectSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                application_id: row.get(2)?,
            })
        })
        .map_err(sql_err)?;
    collect_rows(rows)
}
