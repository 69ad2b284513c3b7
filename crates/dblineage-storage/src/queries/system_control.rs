//! system_control queries: runtime key/value switches.

use dblineage_core::errors::StorageError;
use dblineage_core::types::ConfigEntry;
use rusqlite::{params, Connection};

use super::util::{collect_rows, sql_err};

pub fn config_entries(conn: &Connection) -> Result<Vec<ConfigEntry>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT config_key, config_value, is_active FROM system_control ORDER BY config_key",
        )
        .map_err(sql_err)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(ConfigEntry {
                key: row.get(0)?,
                value: row.get(1)?,
                is_active: row.get(2)?,
            })
        })
        .map_err(sql_err)?;
    collect_rows(rows)
}

pub fn upsert_entry(conn: &Connection, key: &str, value: &str, is_active: bool) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO system_control (config_key, config_value, is_active) VALUES (?1, ?2, ?3)
         ON CONFLICT(config_key) DO UPDATE SET
             config_value = excluded.config_value,
             is_active = excluded.is_active,
             updated_at = unixepoch()",
        params![key, value, is_active],
    )
    .map_err(sql_err)?;
    Ok(())
}
