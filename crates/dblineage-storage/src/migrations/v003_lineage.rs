//! V003: lineage results, generation reports, ETL flows, runtime control.

pub const MIGRATION_SQL: &str = r#"
-- project_key is the sorted project set joined with '_';
-- column_key is the column name or 'ALL'.
CREATE TABLE IF NOT EXISTS lineage_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_key TEXT NOT NULL,
    project_id TEXT NOT NULL,
    table_name TEXT NOT NULL,
    column_name TEXT,
    column_key TEXT NOT NULL,
    lineage_json TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    updated_at INTEGER NOT NULL DEFAULT (unixepoch()),
    UNIQUE (project_key, table_name, column_key)
) STRICT;

CREATE TABLE IF NOT EXISTS lineage_reports (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_key TEXT NOT NULL,
    project_id TEXT NOT NULL,
    table_name TEXT NOT NULL,
    column_name TEXT,
    status TEXT NOT NULL CHECK (status IN ('running', 'completed', 'failed')),
    started_at INTEGER NOT NULL DEFAULT (unixepoch()),
    ended_at INTEGER,
    lineage_json TEXT,
    error TEXT
) STRICT;

CREATE INDEX IF NOT EXISTS idx_lineage_reports_scope ON lineage_reports(project_key, table_name);

CREATE TABLE IF NOT EXISTS table_flows (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL,
    source_table TEXT NOT NULL COLLATE NOCASE,
    target_table TEXT NOT NULL COLLATE NOCASE,
    procedure_name TEXT COLLATE NOCASE,
    flow_sequence INTEGER NOT NULL DEFAULT 0,
    flow_type TEXT CHECK (flow_type IS NULL OR flow_type IN ('ETL', 'TRANSFORM', 'LOAD', 'EXTRACT'))
) STRICT;

CREATE INDEX IF NOT EXISTS idx_table_flows_project ON table_flows(project_id, flow_sequence);

CREATE TABLE IF NOT EXISTS system_control (
    config_key TEXT PRIMARY KEY,
    config_value TEXT NOT NULL,
    description TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    updated_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;
"#;
