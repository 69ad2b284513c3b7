//! Everything lineage generation reads from or writes to persistence.

use crate::errors::StorageError;
use crate::types::{
    ColumnInfo, ComponentRecord, ComponentSource, ConfigEntry, LineageScope, ProjectSummary,
    StoredLineage, TableFlow, TableOverview,
};

pub trait LineageStore {
    // Runtime control entries.

    fn config_entries(&self) -> Result<Vec<ConfigEntry>, StorageError>;

    fn set_config_entry(&self, key: &str, value: &str, is_active: bool)
        -> Result<(), StorageError>;

    // Persisted results and reports.

    fn find_result(&self, scope: &LineageScope) -> Result<Option<StoredLineage>, StorageError>;

    fn upsert_result(&self, scope: &LineageScope, lineage_json: &str) -> Result<(), StorageError>;

    /// Delete every persisted result whose project set includes `project_id`.
    fn delete_results_for_project(&self, project_id: &str) -> Result<usize, StorageError>;

    /// Open a report in `running` state and return its id.
    fn open_report(&self, scope: &LineageScope) -> Result<i64, StorageError>;

    fn complete_report(&self, report_id: i64, lineage_json: &str) -> Result<(), StorageError>;

    fn fail_report(&self, report_id: i64, error: &str) -> Result<(), StorageError>;

    /// Store `lineage_json` as the scope's result and close the running
    /// report as `completed`, in one transaction. Writes nothing when
    /// either step fails.
    fn publish_result(
        &self,
        report_id: i64,
        scope: &LineageScope,
        lineage_json: &str,
    ) -> Result<(), StorageError>;

    // Component graph.

    /// Whether any non-noise component exists for the projects.
    fn has_component_graph(&self, project_ids: &[String]) -> Result<bool, StorageError>;

    /// Components that directly reference the scoped table or column.
    fn referencing_components(&self, scope: &LineageScope)
        -> Result<Vec<ComponentRecord>, StorageError>;

    /// Callees of a component, in call order.
    fn call_children(&self, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError>;

    /// Components referencing `component_id` that are not already among
    /// its call children.
    fn reference_children(&self, component_id: i64)
        -> Result<Vec<ComponentRecord>, StorageError>;

    // Flat schema.

    /// Distinct source files with usages of the scoped table or column, as
    /// file pseudo-components.
    fn usage_files(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError>;

    /// Columns of a table, from the component graph when it has them, else
    /// from the extracted schema. Sorted by name.
    fn table_columns(&self, project_ids: &[String], table: &str)
        -> Result<Vec<ColumnInfo>, StorageError>;

    /// All tables of the projects with their sorted columns.
    fn tables_overview(&self, project_ids: &[String]) -> Result<Vec<TableOverview>, StorageError>;

    // Extras.

    /// Registered ETL flows of the projects, by flow sequence.
    fn table_flows(&self, project_ids: &[String]) -> Result<Vec<TableFlow>, StorageError>;

    fn component_source(&self, component_id: i64)
        -> Result<Option<ComponentSource>, StorageError>;

    /// Projects of an application that contain SQL sources.
    fn projects_with_sql(&self, application_id: &str)
        -> Result<Vec<ProjectSummary>, StorageError>;
}
