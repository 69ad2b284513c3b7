//! Cache key grammar.
//!
//! Project sets are rendered as sorted ids joined by `_`, so project ids
//! themselves must not contain `_`.

use dblineage_core::types::{project_set_key, LineageScope};

pub const LINEAGE: &str = "lineage:";
pub const TABLES: &str = "tables:";
pub const COLUMNS: &str = "columns:";
pub const SCHEMAS: &str = "schemas:";
pub const SOURCE: &str = "source:";
pub const CONFIG: &str = "config:";

/// `lineage:<ids>:<table>:<column|ALL>`
pub fn lineage_key(scope: &LineageScope) -> String {
    format!("{LINEAGE}{}:{}:{}", scope.project_key(), scope.table, scope.column_key())
}

/// `tables:<ids>`
pub fn tables_key(project_ids: &[String]) -> String {
    format!("{TABLES}{}", project_set_key(project_ids))
}

/// `schemas:app:<appId>`
pub fn schemas_by_app_key(app_id: &str) -> String {
    format!("{SCHEMAS}app:{app_id}")
}

/// `source:<componentId>`
pub fn component_source_key(component_id: i64) -> String {
    format!("{SOURCE}{component_id}")
}

pub fn lineage_config_key() -> String {
    format!("{CONFIG}lineage")
}

/// Glob patterns covering every key that involves `project_id`, alone or as
/// part of a project set. The id is matched literally. Application schema
/// listings carry no project id and are dropped wholesale.
pub fn project_patterns(project_id: &str) -> Vec<String> {
    let project_id = glob::Pattern::escape(project_id);
    let mut patterns = Vec::with_capacity(19);
    for prefix in [LINEAGE, TABLES, COLUMNS] {
        patterns.push(format!("{prefix}{project_id}"));
        patterns.push(format!("{prefix}{project_id}:*"));
        patterns.push(format!("{prefix}{project_id}_*"));
        patterns.push(format!("{prefix}*_{project_id}"));
        patterns.push(format!("{prefix}*_{project_id}:*"));
        patterns.push(format!("{prefix}*_{project_id}_*"));
    }
    patterns.push(format!("{SCHEMAS}*"));
    patterns
}
