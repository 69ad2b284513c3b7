//! Component graph queries: components, traces, call hierarchy, sources.

use dblineage_core::errors::StorageError;
use dblineage_core::types::{
    ColumnInfo, ComponentKey, ComponentRecord, ComponentSource, ComponentType,
};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, ToSql};

use super::util::{collect_rows, placeholders, project_params, sql_err};

/// A component to insert.
#[derive(Debug, Clone)]
pub struct NewComponent {
    pub project_id: String,
    pub source_file_id: Option<i64>,
    pub name: String,
    pub component_type: ComponentType,
    pub description: Option<String>,
    pub parent_id: Option<i64>,
    pub is_noise: bool,
    pub order_seq: i64,
}

impl NewComponent {
    pub fn new(project_id: &str, name: &str, component_type: ComponentType) -> Self {
        Self {
            project_id: project_id.to_string(),
            source_file_id: None,
            name: name.to_string(),
            component_type,
            description: None,
            parent_id: None,
            is_noise: false,
            order_seq: 0,
        }
    }
}

const DEFINITION_TYPES: &str = "('CREATE_TABLE_STATEMENT', 'CREATE_COLUMN_DEFINITION')";

pub fn insert_component(conn: &Connection, component: &NewComponent) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO components
             (project_id, source_file_id, name, component_type, description,
              parent_id, is_noise, order_seq)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            component.project_id,
            component.source_file_id,
            component.name,
            component.component_type.as_str(),
            component.description,
            component.parent_id,
            component.is_noise,
            component.order_seq,
        ],
    )
    .map_err(sql_err)?;
    Ok(conn.last_insert_rowid())
}

/// Record that `referencing` references `referenced`.
pub fn insert_trace(
    conn: &Connection,
    referenced: i64,
    referencing: i64,
    relationship_type: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO component_traces
             (parent_component_id, child_component_id, relationship_type)
         VALUES (?1, ?2, ?3)",
        params![referenced, referencing, relationship_type],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub fn insert_call(conn: &Connection, caller: i64, callee: i64, call_order: i64) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO call_hierarchy (caller_id, callee_id, call_order) VALUES (?1, ?2, ?3)
         ON CONFLICT(caller_id, callee_id) DO UPDATE SET call_order = excluded.call_order",
        params![caller, callee, call_order],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub fn upsert_component_source(
    conn: &Connection,
    component_id: i64,
    file_path: Option<&str>,
    source_code: &str,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO component_sources (component_id, file_path, source_code) VALUES (?1, ?2, ?3)
         ON CONFLICT(component_id) DO UPDATE SET file_path = excluded.file_path,
                                                 source_code = excluded.source_code",
        params![component_id, file_path, source_code],
    )
    .map_err(sql_err)?;
    Ok(())
}

pub fn component_source(conn: &Connection, component_id: i64) -> Result<Option<ComponentSource>, StorageError> {
    conn.query_row(
        "SELECT component_id, file_path, source_code FROM component_sources WHERE component_id = ?1",
        params![component_id],
        |row| {
            Ok(ComponentSource {
                component_id: row.get(0)?,
                file_path: row.get(1)?,
                source_code: row.get(2)?,
            })
        },
    )
    .optional()
    .map_err(sql_err)
}

/// Whether the project set has any non-noise component.
pub fn has_components(conn: &Connection, project_ids: &[String]) -> Result<bool, StorageError> {
    if project_ids.is_empty() {
        return Ok(false);
    }
    let sql = format!(
        "SELECT EXISTS (SELECT 1 FROM components WHERE project_id IN ({}) AND is_noise = 0)",
        placeholders(1, project_ids.len())
    );
    conn.query_row(&sql, params_from_iter(project_params(project_ids)), |row| row.get(0))
        .map_err(sql_err)
}

/// Components directly referencing the TABLE component named `table`, or
/// the COLUMN component `column` under it.
pub fn referencing_components(
    conn: &Connection,
    project_ids: &[String],
    table: &str,
    column: Option<&str>,
) -> Result<Vec<ComponentRecord>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let n = project_ids.len();
    let target = match column {
        Some(_) => format!(
            "FROM components tbl
             JOIN components target ON target.parent_id = tbl.id
                  AND target.component_type = 'COLUMN' AND target.name = ?{}",
            n + 2
        ),
        None => "FROM components tbl JOIN components target ON target.id = tbl.id".to_string(),
    };
    let sql = format!(
        "SELECT DISTINCT c.id, c.name, c.component_type, c.description, c.order_seq
         {target}
         JOIN component_traces tr ON tr.parent_component_id = target.id
         JOIN components c ON c.id = tr.child_component_id
         WHERE tbl.project_id IN ({}) AND tbl.component_type = 'TABLE' AND tbl.name = ?{}
           AND c.is_noise = 0 AND c.component_type NOT IN {DEFINITION_TYPES}
         ORDER BY c.order_seq, c.id",
        placeholders(1, n),
        n + 1
    );
    let mut values = project_params(project_ids);
    values.push(&table as &dyn ToSql);
    if let Some(ref column) = column {
        values.push(column as &dyn ToSql);
    }
    query_components(conn, &sql, values)
}

/// Components called by `component_id`, in call order.
pub fn call_children(conn: &Connection, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError> {
    query_components(
        conn,
        "SELECT c.id, c.name, c.component_type, c.description, h.call_order
         FROM call_hierarchy h JOIN components c ON c.id = h.callee_id
         WHERE h.caller_id = ?1 AND c.is_noise = 0
         ORDER BY h.call_order, c.id",
        vec![&component_id as &dyn ToSql],
    )
}

/// Components referencing `component_id` that it does not also call.
pub fn reference_children(conn: &Connection, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError> {
    let sql = format!(
        "SELECT DISTINCT c.id, c.name, c.component_type, c.description, c.order_seq
         FROM component_traces tr JOIN components c ON c.id = tr.child_component_id
         WHERE tr.parent_component_id = ?1
           AND c.is_noise = 0 AND c.component_type NOT IN {DEFINITION_TYPES}
           AND c.id NOT IN (SELECT callee_id FROM call_hierarchy WHERE caller_id = ?1)
         ORDER BY c.order_seq, c.id"
    );
    query_components(conn, &sql, vec![&component_id as &dyn ToSql])
}

/// COLUMN components under the TABLE component `table`, sorted by name.
/// The description holds the declared type when known.
pub fn component_table_columns(
    conn: &Connection,
    project_ids: &[String],
    table: &str,
) -> Result<Vec<ColumnInfo>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT col.id, col.name, COALESCE(col.description, '')
         FROM components tbl JOIN components col ON col.parent_id = tbl.id
         WHERE tbl.project_id IN ({}) AND tbl.component_type = 'TABLE' AND tbl.name = ?{}
           AND col.component_type = 'COLUMN' AND col.is_noise = 0
         ORDER BY col.name COLLATE NOCASE, col.id",
        placeholders(1, project_ids.len()),
        project_ids.len() + 1
    );
    let mut values = project_params(project_ids);
    values.push(&table as &dyn ToSql);
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values), |row| {
            Ok(ColumnInfo {
                id: row.get(0)?,
                name: row.get(1)?,
                data_type: row.get(2)?,
                is_primary_key: false,
                is_foreign_key: false,
            })
        })
        .map_err(sql_err)?;
    let mut columns: Vec<ColumnInfo> = Vec::new();
    for column in collect_rows(rows)? {
        if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(&column.name)) {
            columns.push(column);
        }
    }
    Ok(columns)
}

/// `(table, column)` pairs of the component graph, ordered by table.
pub fn component_tables(
    conn: &Connection,
    project_ids: &[String],
) -> Result<Vec<(String, ColumnInfo)>, StorageError> {
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT tbl.name, col.id, col.name, COALESCE(col.description, '')
         FROM components tbl JOIN components col ON col.parent_id = tbl.id
         WHERE tbl.project_id IN ({}) AND tbl.component_type = 'TABLE'
           AND col.component_type = 'COLUMN' AND col.is_noise = 0
         ORDER BY tbl.name COLLATE NOCASE, col.name COLLATE NOCASE, col.id",
        placeholders(1, project_ids.len())
    );
    let mut stmt = conn.prepare(&sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(project_params(project_ids)), |row| {
            Ok((
                row.get::<_, String>(0)?,
                ColumnInfo {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    data_type: row.get(3)?,
                    is_primary_key: false,
                    is_foreign_key: false,
                },
            ))
        })
        .map_err(sql_err)?;
    collect_rows(rows)
}

fn query_components(
    conn: &Connection,
    sql: &str,
    values: Vec<&dyn ToSql>,
) -> Result<Vec<ComponentRecord>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(sql_err)?;
    let rows = stmt
        .query_map(params_from_iter(values), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })
        .map_err(sql_err)?;
    collect_rows(rows)?
        .into_iter()
        .map(|(id, name, component_type, description)| {
            let component_type = component_type
                .parse::<ComponentType>()
                .map_err(|message| StorageError::Serialization { message })?;
            Ok(ComponentRecord {
                key: ComponentKey::Component(id),
                name,
                component_type,
                description,
            })
        })
        .collect()
}
