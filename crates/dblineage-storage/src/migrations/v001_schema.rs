//! V001: projects, source files, extracted schema, column usages.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS projects (
    id TEXT PRIMARY KEY,
    application_id TEXT,
    name TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
) STRICT;

CREATE INDEX IF NOT EXISTS idx_projects_application ON projects(application_id);

CREATE TABLE IF NOT EXISTS source_files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL,
    path TEXT NOT NULL,
    language TEXT NOT NULL,
    content TEXT NOT NULL,
    parsed INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    UNIQUE (project_id, path)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_source_files_project ON source_files(project_id, parsed);

-- Table and column names compare case-insensitively, so `Users` from a
-- model and `users` from DDL are the same table.
CREATE TABLE IF NOT EXISTS db_tables (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL,
    name TEXT NOT NULL COLLATE NOCASE,
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    UNIQUE (project_id, name)
) STRICT;

CREATE TABLE IF NOT EXISTS db_columns (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_id INTEGER NOT NULL REFERENCES db_tables(id) ON DELETE CASCADE,
    name TEXT NOT NULL COLLATE NOCASE,
    data_type TEXT NOT NULL DEFAULT '',
    is_primary_key INTEGER NOT NULL DEFAULT 0,
    is_foreign_key INTEGER NOT NULL DEFAULT 0,
    foreign_table TEXT,
    foreign_column TEXT,
    UNIQUE (table_id, name)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_db_columns_table ON db_columns(table_id);

CREATE TABLE IF NOT EXISTS column_usages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    column_id INTEGER NOT NULL REFERENCES db_columns(id) ON DELETE CASCADE,
    source_file_id INTEGER NOT NULL REFERENCES source_files(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    usage_type TEXT NOT NULL CHECK (usage_type IN
        ('read', 'write', 'update', 'delete', 'join', 'filter', 'projection')),
    code_snippet TEXT NOT NULL,
    context TEXT NOT NULL,
    created_at INTEGER NOT NULL DEFAULT (unixepoch()),
    UNIQUE (column_id, source_file_id, line_number, usage_type)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_column_usages_file ON column_usages(source_file_id);
"#;
