//! V002: component graph, populated by richer upstream analyzers.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS components (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL,
    source_file_id INTEGER REFERENCES source_files(id) ON DELETE SET NULL,
    name TEXT NOT NULL COLLATE NOCASE,
    component_type TEXT NOT NULL,
    description TEXT,
    parent_id INTEGER REFERENCES components(id) ON DELETE CASCADE,
    is_noise INTEGER NOT NULL DEFAULT 0,
    order_seq INTEGER NOT NULL DEFAULT 0
) STRICT;

CREATE INDEX IF NOT EXISTS idx_components_project_type ON components(project_id, component_type, name);
CREATE INDEX IF NOT EXISTS idx_components_parent ON components(parent_id);

-- parent_component_id is referenced by child_component_id.
CREATE TABLE IF NOT EXISTS component_traces (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    parent_component_id INTEGER NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    child_component_id INTEGER NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    relationship_type TEXT NOT NULL DEFAULT 'REFERENCES'
        CHECK (relationship_type IN ('CONTAINS', 'CALLS', 'REFERENCES', 'USES')),
    UNIQUE (parent_component_id, child_component_id, relationship_type)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_component_traces_parent ON component_traces(parent_component_id);

CREATE TABLE IF NOT EXISTS call_hierarchy (
    caller_id INTEGER NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    callee_id INTEGER NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    call_order INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (caller_id, callee_id)
) STRICT;

CREATE TABLE IF NOT EXISTS component_sources (
    component_id INTEGER PRIMARY KEY REFERENCES components(id) ON DELETE CASCADE,
    file_path TEXT,
    source_code TEXT NOT NULL
) STRICT;
"#;
