use dblineage_core::errors::StorageError;
use dblineage_core::traits::LineageStore;
use dblineage_core::types::{
    ColumnInfo, ComponentKey, ComponentRecord, ComponentSource, ComponentType, ConfigEntry,
    LineageScope, ProjectSummary, StoredLineage, TableFlow, TableOverview,
};

use crate::connection::writer::with_immediate_transaction;
use crate::queries::{
    components, lineage_reports, lineage_results, projects, schema, system_control, table_flows,
    usages,
};
use crate::DatabaseManager;

impl LineageStore for DatabaseManager {
    fn config_entries(&self) -> Result<Vec<ConfigEntry>, StorageError> {
        self.with_reader(system_control::config_entries)
    }

    fn set_config_entry(&self, key: &str, value: &str, is_active: bool) -> Result<(), StorageError> {
        self.with_writer(|conn| system_control::upsert_entry(conn, key, value, is_active))
    }

    fn find_result(&self, scope: &LineageScope) -> Result<Option<StoredLineage>, StorageError> {
        self.with_reader(|conn| lineage_results::find_result(conn, scope))
    }

    fn upsert_result(&self, scope: &LineageScope, lineage_json: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| lineage_results::upsert_result(conn, scope, lineage_json))
    }

    fn delete_results_for_project(&self, project_id: &str) -> Result<usize, StorageError> {
        self.with_writer(|conn| lineage_results::delete_results_for_project(conn, project_id))
    }

    fn open_report(&self, scope: &LineageScope) -> Result<i64, StorageError> {
        self.with_writer(|conn| lineage_reports::open_report(conn, scope))
    }

    fn complete_report(&self, report_id: i64, lineage_json: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| lineage_reports::complete_report(conn, report_id, lineage_json))
    }

    fn fail_report(&self, report_id: i64, error: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| lineage_reports::fail_report(conn, report_id, error))
    }

    fn publish_result(&self, report_id: i64, scope: &LineageScope, lineage_json: &str) -> Result<(), StorageError> {
        self.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                lineage_results::upsert_result(tx, scope, lineage_json)?;
                lineage_reports::complete_report(tx, report_id, lineage_json)
            })
        })
    }

    fn has_component_graph(&self, project_ids: &[String]) -> Result<bool, StorageError> {
        self.with_reader(|conn| components::has_components(conn, project_ids))
    }

    fn referencing_components(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError> {
        self.with_reader(|conn| {
            components::referencing_components(
                conn,
                &scope.project_ids,
                &scope.table,
                scope.column.as_deref(),
            )
        })
    }

    fn call_children(&self, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError> {
        self.with_reader(|conn| components::call_children(conn, component_id))
    }

    fn reference_children(&self, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError> {
        self.with_reader(|conn| components::reference_children(conn, component_id))
    }

    fn usage_files(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError> {
        let files = self.with_reader(|conn| {
            usages::usage_files(conn, &scope.project_ids, &scope.table, scope.column.as_deref())
        })?;
        Ok(files
            .into_iter()
            .map(|file| ComponentRecord {
                key: ComponentKey::File(file.source_file_id),
                name: file.path,
                component_type: ComponentType::File,
                description: Some(format!(
                    "{} usage(s): {}",
                    file.usage_count,
                    file.usage_types.join(", ")
                )),
            })
            .collect())
    }

    fn table_columns(&self, project_ids: &[String], table: &str) -> Result<Vec<ColumnInfo>, StorageError> {
        self.with_reader(|conn| {
            let from_graph = components::component_table_columns(conn, project_ids, table)?;
            if !from_graph.is_empty() {
                return Ok(from_graph);
            }
            schema::table_columns(conn, project_ids, table)
        })
    }

    fn tables_overview(&self, project_ids: &[String]) -> Result<Vec<TableOverview>, StorageError> {
        self.with_reader(|conn| {
            let from_graph = components::component_tables(conn, project_ids)?;
            if !from_graph.is_empty() {
                return Ok(schema::group_by_table(from_graph));
            }
            schema::tables_overview(conn, project_ids)
        })
    }

    fn table_flows(&self, project_ids: &[String]) -> Result<Vec<TableFlow>, StorageError> {
        self.with_reader(|conn| table_flows::flows_for_projects(conn, project_ids))
    }

    fn component_source(&self, component_id: i64) -> Result<Option<ComponentSource>, StorageError> {
        self.with_reader(|conn| components::component_source(conn, component_id))
    }

    fn projects_with_sql(&self, application_id: &str) -> Result<Vec<ProjectSummary>, StorageError> {
        self.with_reader(|conn| projects::projects_with_sql(conn, application_id))
    }
}
