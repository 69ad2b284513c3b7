//! Tests for lineage results, reports, the component graph, and control entries.

use dblineage_core::traits::LineageStore;
use dblineage_core::types::{
    ComponentKey, ComponentType, LineageScope, ProjectSummary, ReportStatus, TableFlow,
};
use dblineage_core::traits::SourceStore;
use dblineage_core::types::NewSourceFile;
use dblineage_storage::queries::components::{self, NewComponent};
use dblineage_storage::queries::{lineage_reports, lineage_results, projects, table_flows};
use dblineage_storage::DatabaseManager;

fn setup_db() -> DatabaseManager {
    DatabaseManager::open_in_memory().unwrap()
}

fn scope(ids: &[&str], table: &str, column: Option<&str>) -> LineageScope {
    LineageScope::new(
        ids.iter().map(|s| s.to_string()).collect(),
        table,
        column.map(str::to_string),
    )
}

#[test]
fn result_upsert_replaces_by_project_set_table_and_column() {
    let db = setup_db();
    let a = scope(&["p2", "p1"], "orders", None);
    let b = scope(&["p1", "p2"], "orders", None);
    db.upsert_result(&a, "{\"v\":1}").unwrap();
    db.upsert_result(&b, "{\"v\":2}").unwrap();
    db.upsert_result(&scope(&["p1", "p2"], "orders", Some("status")), "{}").unwrap();

    let found = db.find_result(&a).unwrap().unwrap();
    assert_eq!(found.lineage_json, "{\"v\":2}");
    assert_eq!(db.with_reader(lineage_results::count_results).unwrap(), 2);
    assert!(db.find_result(&scope(&["p1"], "orders", None)).unwrap().is_none());
}

#[test]
fn deleting_results_matches_whole_project_ids_only() {
    let db = setup_db();
    db.upsert_result(&scope(&["p1"], "orders", None), "{}").unwrap();
    db.upsert_result(&scope(&["p1", "p2"], "orders", None), "{}").unwrap();
    db.upsert_result(&scope(&["p10"], "orders", None), "{}").unwrap();

    let deleted = db.delete_results_for_project("p1").unwrap();
    assert_eq!(deleted, 2);
    assert!(db.find_result(&scope(&["p10"], "orders", None)).unwrap().is_some());
}

#[test]
fn report_lifecycle() {
    let db = setup_db();
    let s = scope(&["p1"], "orders", None);
    let ok = db.open_report(&s).unwrap();
    db.complete_report(ok, "{}").unwrap();
    let failed = db.open_report(&s).unwrap();
    db.fail_report(failed, "boom").unwrap();

    let ok_row = db.with_reader(|c| lineage_reports::get_report(c, ok)).unwrap().unwrap();
    assert_eq!(ok_row.status, ReportStatus::Completed);
    assert_eq!(ok_row.lineage_json.as_deref(), Some("{}"));
    assert!(ok_row.ended_at.is_some());

    let latest = db
        .with_reader(|c| lineage_reports::latest_report(c, "p1", "orders"))
        .unwrap()
        .unwrap();
    assert_eq!(latest.id, failed);
    assert_eq!(latest.status, ReportStatus::Failed);
    assert_eq!(latest.error.as_deref(), Some("boom"));

    // A closed report cannot be closed again.
    assert!(db.complete_report(ok, "{}").is_err());
}

#[test]
fn publish_stores_result_and_completes_report_together() {
    let db = setup_db();
    let s = scope(&["p1"], "orders", None);
    let report = db.open_report(&s).unwrap();
    db.publish_result(report, &s, "{\"v\":1}").unwrap();
    assert_eq!(db.find_result(&s).unwrap().unwrap().lineage_json, "{\"v\":1}");
    let row = db.with_reader(|c| lineage_reports::get_report(c, report)).unwrap().unwrap();
    assert_eq!(row.status, ReportStatus::Completed);

    // Report already closed: the result write is rolled back.
    let other = scope(&["p1"], "orders", Some("status"));
    let closed = db.open_report(&other).unwrap();
    db.fail_report(closed, "gone").unwrap();
    assert!(db.publish_result(closed, &other, "{}").is_err());
    assert!(db.find_result(&other).unwrap().is_none());
}

#[test]
fn component_graph_queries() {
    let db = setup_db();
    let ids = vec!["p1".to_string()];
    assert!(!db.has_component_graph(&ids).unwrap());

    let (table, column, proc_a, proc_b, func, noise) = db
        .with_writer(|c| {
            let table = components::insert_component(c, &NewComponent::new("p1", "orders", ComponentType::Table))?;
            let mut col = NewComponent::new("p1", "status", ComponentType::Column);
            col.parent_id = Some(table);
            col.description = Some("VARCHAR(20)".into());
            let column = components::insert_component(c, &col)?;
            let proc_a = components::insert_component(c, &NewComponent::new("p1", "load_orders", ComponentType::Procedure))?;
            let proc_b = components::insert_component(c, &NewComponent::new("p1", "ship_orders", ComponentType::Procedure))?;
            let func = components::insert_component(c, &NewComponent::new("p1", "calc_total", ComponentType::FunctionCall))?;
            let mut noisy = NewComponent::new("p1", "logger", ComponentType::Function);
            noisy.is_noise = true;
            let noise = components::insert_component(c, &noisy)?;
            components::insert_trace(c, table, proc_a, "REFERENCES")?;
            components::insert_trace(c, column, proc_b, "USES")?;
            components::insert_trace(c, table, noise, "REFERENCES")?;
            components::insert_call(c, proc_a, func, 1)?;
            components::insert_trace(c, proc_a, func, "CALLS")?;
            components::insert_trace(c, proc_a, proc_b, "REFERENCES")?;
            components::upsert_component_source(c, proc_a, Some("etl.sql"), "CREATE PROCEDURE load_orders ...")?;
            Ok((table, column, proc_a, proc_b, func, noise))
        })
        .unwrap();
    let _ = (table, column, noise);

    assert!(db.has_component_graph(&ids).unwrap());

    let roots = db.referencing_components(&scope(&["p1"], "ORDERS", None)).unwrap();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].key, ComponentKey::Component(proc_a));
    assert_eq!(roots[0].component_type, ComponentType::Procedure);

    let column_roots = db.referencing_components(&scope(&["p1"], "orders", Some("status"))).unwrap();
    assert_eq!(column_roots.len(), 1);
    assert_eq!(column_roots[0].name, "ship_orders");

    let calls = db.call_children(proc_a).unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].key, ComponentKey::Component(func));

    // The callee is excluded from reference children.
    let refs = db.reference_children(proc_a).unwrap();
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].key, ComponentKey::Component(proc_b));

    let columns = db.table_columns(&ids, "orders").unwrap();
    assert_eq!(columns.len(), 1);
    assert_eq!(columns[0].data_type, "VARCHAR(20)");

    let source = db.component_source(proc_a).unwrap().unwrap();
    assert_eq!(source.file_path.as_deref(), Some("etl.sql"));
    assert!(db.component_source(func).unwrap().is_none());
}

#[test]
fn flows_and_projects() {
    let db = setup_db();
    db.with_writer(|c| {
        projects::upsert_project(c, &ProjectSummary { id: "p1".into(), name: "billing".into(), application_id: Some("app".into()) })?;
        projects::upsert_project(c, &ProjectSummary { id: "p2".into(), name: "web".into(), application_id: Some("app".into()) })?;
        table_flows::insert_flow(c, "p1", &TableFlow {
            source_table: "staging_orders".into(),
            target_table: "orders".into(),
            procedure_name: Some("load_orders".into()),
            flow_sequence: 2,
            flow_type: Some("LOAD".into()),
        })?;
        table_flows::insert_flow(c, "p1", &TableFlow {
            source_table: "raw_orders".into(),
            target_table: "staging_orders".into(),
            procedure_name: None,
            flow_sequence: 1,
            flow_type: None,
        })?;
        Ok(())
    })
    .unwrap();
    db.upsert_source_file("p1", &NewSourceFile::detect("db/schema.sql", "CREATE TABLE t (a INT);")).unwrap();
    db.upsert_source_file("p2", &NewSourceFile::detect("web/app.ts", "")).unwrap();

    let flows = db.table_flows(&["p1".to_string()]).unwrap();
    assert_eq!(flows.len(), 2);
    assert_eq!(flows[0].source_table, "raw_orders");

    let with_sql = db.projects_with_sql("app").unwrap();
    assert_eq!(with_sql.len(), 1);
    assert_eq!(with_sql[0].id, "p1");
}

#[test]
fn config_entries_upsert() {
    let db = setup_db();
    db.set_config_entry("MAX_HIERARCHY_DEPTH", "5", true).unwrap();
    db.set_config_entry("MAX_HIERARCHY_DEPTH", "6", false).unwrap();
    let entries = db.config_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].value, "6");
    assert!(!entries[0].is_active);
}
