//! lineage_reports queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::{LineageScope, ReportStatus};
use rusqlite::{params, Connection, OptionalExtension};

use super::util::sql_err;

#[derive(Debug, Clone)]
pub struct ReportRecord {
    pub id: i64,
    pub project_key: String,
    pub table_name: String,
    pub column_name: Option<String>,
    pub status: ReportStatus,
    pub started_at: i64,
    pub ended_at: Option<i64>,
    pub lineage_json: Option<String>,
    pub error: Option<String>,
}

pub fn open_report(conn: &Connection, scope: &LineageScope) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO lineage_reports (project_key, project_id, table_name, column_name, status)
         VALUES (?1, ?2, ?3, ?4, 'running')",
        params![
            scope.project_key(),
            scope.primary_project().unwrap_or_default(),
            scope.table,
            scope.column,
        ],
    )
    .map_err(sql_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn complete_report(conn: &Connection, report_id: i64, lineage_json: &str) -> Result<(), StorageError> {
    close_report(conn, report_id, ReportStatus::Completed, Some(lineage_json), None)
}

pub fn fail_report(conn: &Connection, report_id: i64, error: &str) -> Result<(), StorageError> {
    close_report(conn, report_id, ReportStatus::Failed, None, Some(error))
}

fn close_report(
    conn: &Connection,
    report_id: i64,
    status: ReportStatus,
    lineage_json: Option<&str>,
    error: Option<&str>,
) -> Result<(), StorageError> {
    let changed = conn
        .execute(
            "UPDATE lineage_reports
             SET status = ?2, ended_at = unixepoch(), lineage_json = ?3, error = ?4
             WHERE id = ?1 AND status = 'running'",
            params![report_id, status.as_str(), lineage_json, error],
        )
        .map_err(sql_err)?;
    if changed == 0 {
        return Err(StorageError::NotFound {
            entity: "running lineage report".to_string(),
            id: report_id.to_string(),
        });
    }
    Ok(())
}

pub fn get_report(conn: &Connection, report_id: i64) -> Result<Option<ReportRecord>, StorageError> {
    let row = conn
        .query_row(
            "SELECT id, project_key, table_name, column_name, status, started_at, ended_at,
                    lineage_json, error
             FROM lineage_reports WHERE id = ?1",
            params![report_id],
            row_to_report,
        )
        .optional()
        .map_err(sql_err)?;
    row.map(finish_report).transpose()
}

/// Most recent report for a table, newest first by id.
pub fn latest_report(conn: &Connection, project_key: &str, table: &str) -> Result<Option<ReportRecord>, StorageError> {
    let row = conn
        .query_row(
            "SELECT id, project_key, table_name, column_name, status, started_at, ended_at,
                    lineage_json, error
             FROM lineage_reports WHERE project_key = ?1 AND table_name = ?2
             ORDER BY id DESC LIMIT 1",
            params![project_key, table],
            row_to_report,
        )
        .optional()
        .map_err(sql_err)?;
    row.map(finish_report).transpose()
}

type RawReport = (ReportRecord, String);

fn row_to_report(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReport> {
    Ok((
        ReportRecord {
            id: row.get(0)?,
            project_key: row.get(1)?,
            table_name: row.get(2)?,
            column_name: row.get(3)?,
            status: ReportStatus::Running,
            started_at: row.get(5)?,
            ended_at: row.get(6)?,
            lineage_json: row.get(7)?,
            error: row.get(8)?,
        },
        row.get(4)?,
    ))
}

fn finish_report((mut record, status): RawReport) -> Result<ReportRecord, StorageError> {
    record.status = status
        .parse()
        .map_err(|message| StorageError::Serialization { message })?;
    Ok(record)
}
