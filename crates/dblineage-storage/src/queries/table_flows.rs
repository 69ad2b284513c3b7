//! table_flows queries.

use dblineage_core::errors::StorageError;
use dblineage_core::types::TableFlow;
use rusqlite::{params, params_from_iter, Connection};

use super::util::{collect_rows, placeholders, project_params, sql_err};

pub fn insert_flow(conn: &Connection, project_id: &str, flow: &TableFlow) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO table_flows
             (project_id, source_table, target_table, procedure_name, flow_sequence, flow_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            project_id,
            flow.source_table,
            flow.target_table,
            flow.procedure_name,
            flow.flow_sequence,
            flow.flow_type,
        ],
    )
    .map_err(sql_err)?;
    Ok(conn.last_insert_rowid())
}

pub fn flows_for_projects(conn: &Connection, project_ids: &[String]) -> Result<Vec<TableFlow>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT source_table, target_table, procedure_name, flow_sequence, flow_type
         FROM table_flows WHERE project_id IN ({})
         ORDER BY flow_sequence, id",
        placeholders(1, project_ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(project_params(project_ids)), |row| {
            Ok(TableFlow {
                source_table: row.get(0)?,
                target_table: row.get(1)?,
                procedure_name: row.get(2)?,
                flow_sequence: row.get(3)?,
                flow_type: row.get(4)?,
            })
        })
        .map_err(sql_err)?;
    collect_rows(rows)
}
