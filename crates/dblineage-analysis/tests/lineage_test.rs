//! Lineage trees: builder traversal, the service's cache and persistence
//! layers, reports, and ETL extension.

use std::sync::Arc;

use dblineage_analysis::cache::keys;
use dblineage_analysis::lineage::{
    LineageBuilder, LineageRequest, LineageService, LineageTree, MemoryGraph,
};
use dblineage_core::config::lineage_config::ETL_FLAG_KEY;
use dblineage_core::errors::{LineageError, StorageError};
use dblineage_core::traits::LineageStore;
use dblineage_core::types::{
    ColumnInfo, ComponentKey, ComponentRecord, ComponentSource, ComponentType, ConfigEntry,
    LineageScope, NodeColors, ProjectSummary, ReportStatus, StoredLineage, TableFlow, TableOverview,
};
use dblineage_core::DbLineageConfig;
use dblineage_storage::queries::components::{self, NewComponent};
use dblineage_storage::queries::{lineage_reports, table_flows};
use dblineage_storage::DatabaseManager;

fn setup_db() -> DatabaseManager {
    DatabaseManager::open_in_memory().unwrap()
}

fn record(id: i64, name: &str, component_type: ComponentType) -> ComponentRecord {
    ComponentRecord {
        key: ComponentKey::Component(id),
        name: name.to_string(),
        component_type,
        description: None,
    }
}

fn scope(table: &str) -> LineageScope {
    LineageScope::new(vec!["p1".to_string()], table, None)
}

/// orders <- load_orders -> calc_total, status <- ship_orders.
fn seed_graph(db: &DatabaseManager) -> (i64, i64) {
    db.with_writer(|c| {
        let table = components::insert_component(c, &NewComponent::new("p1", "orders", ComponentType::Table))?;
        let mut status = NewComponent::new("p1", "status", ComponentType::Column);
        status.parent_id = Some(table);
        status.description = Some("VARCHAR(20)".into());
        let status = components::insert_component(c, &status)?;
        let load = components::insert_component(c, &NewComponent::new("p1", "load_orders", ComponentType::Procedure))?;
        let calc = components::insert_component(c, &NewComponent::new("p1", "calc_total", ComponentType::FunctionCall))?;
        let ship = components::insert_component(c, &NewComponent::new("p1", "ship_orders", ComponentType::Procedure))?;
        components::insert_trace(c, table, load, "REFERENCES")?;
        components::insert_trace(c, status, ship, "USES")?;
        components::insert_call(c, load, calc, 1)?;
        Ok((load, calc))
    })
    .unwrap()
}

#[test]
fn mutual_calls_yield_one_cycle_placeholder() {
    let mut graph = MemoryGraph::new();
    let a = record(1, "proc_a", ComponentType::Procedure);
    let b = record(2, "proc_b", ComponentType::Procedure);
    graph.add_component(a.clone());
    graph.add_component(b.clone());
    graph.add_call(a.key, b.key);
    graph.add_call(b.key, a.key);
    graph.add_root("orders", None, a.key);

    let colors = NodeColors::default();
    let tree = LineageBuilder::new(&graph, &colors, 10).build(&scope("orders")).unwrap();

    assert_eq!(tree.len(), 4);
    let cycles: Vec<_> = tree.cycle_nodes().collect();
    assert_eq!(cycles.len(), 1);
    let (id, node) = cycles[0];
    assert_eq!(node.name, "proc_a");
    assert_eq!(tree.children(id).count(), 0);
    assert_eq!(tree.depth(id), 3);
}

#[test]
fn mutual_references_terminate_without_placeholder() {
    let mut graph = MemoryGraph::new();
    let a = record(1, "view_a", ComponentType::Function);
    let b = record(2, "view_b", ComponentType::Function);
    graph.add_component(a.clone());
    graph.add_component(b.clone());
    graph.add_reference(a.key, b.key);
    graph.add_reference(b.key, a.key);
    graph.add_root("orders", None, a.key);

    let colors = NodeColors::default();
    let tree = LineageBuilder::new(&graph, &colors, 10).build(&scope("orders")).unwrap();

    // root -> view_a -> view_b; the edge back to view_a is dropped
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.cycle_nodes().count(), 0);
    assert_eq!(tree.max_depth(), 2);
}

#[test]
fn long_call_chains_stop_at_max_depth() {
    let mut graph = MemoryGraph::new();
    let chain: Vec<_> = (1..=8)
        .map(|i| record(i, &format!("step_{i}"), ComponentType::Function))
        .collect();
    for r in &chain {
        graph.add_component(r.clone());
    }
    for pair in chain.windows(2) {
        graph.add_call(pair[0].key, pair[1].key);
    }
    graph.add_root("orders", None, chain[0].key);

    let colors = NodeColors::default();
    let tree = LineageBuilder::new(&graph, &colors, 3).build(&scope("orders")).unwrap();
    assert_eq!(tree.max_depth(), 3);
    assert_eq!(tree.len(), 4);
    assert_eq!(tree.cycle_nodes().count(), 0);
}

#[test]
fn service_serves_cache_then_persisted_result() {
    let db = setup_db();
    let (load, calc) = seed_graph(&db);
    let service = LineageService::from_config(Arc::new(db), &DbLineageConfig::default());
    let request = LineageRequest::table(vec!["p1".into()], "orders");

    let first = service.build_lineage(&request).unwrap();
    assert!(!first.from_cache);
    let root = first.tree.root();
    assert_eq!(root.name, "orders");
    assert_eq!(root.type_information.len(), 1);
    assert_eq!(root.type_information[0].name, "status");

    let (proc_id, proc_node) = first.tree.children(LineageTree::ROOT).next().unwrap();
    assert_eq!(proc_node.component, Some(ComponentKey::Component(load)));
    let callees: Vec<_> = first.tree.children(proc_id).map(|(_, n)| n.component).collect();
    assert_eq!(callees, vec![Some(ComponentKey::Component(calc))]);

    let second = service.build_lineage(&request).unwrap();
    assert!(second.from_cache);
    assert_eq!(second.tree.to_json().unwrap(), first.tree.to_json().unwrap());

    service.cache().delete(&keys::lineage_key(&scope("orders")));
    let persisted = service.build_lineage(&request).unwrap();
    assert!(persisted.from_cache);
    assert_eq!(persisted.tree, first.tree);

    let regenerated = service.build_lineage(&request.clone().regenerate(true)).unwrap();
    assert!(!regenerated.from_cache);
    assert_eq!(regenerated.tree, first.tree);

    let report = service
        .store()
        .with_reader(|c| lineage_reports::latest_report(c, "p1", "orders"))
        .unwrap()
        .unwrap();
    assert_eq!(report.status, ReportStatus::Completed);
    assert!(report.lineage_json.is_some());
}

#[test]
fn invalidating_a_project_forces_generation() {
    let db = setup_db();
    seed_graph(&db);
    let service = LineageService::from_config(Arc::new(db), &DbLineageConfig::default());
    let request = LineageRequest::column(vec!["p1".into()], "orders", "status");

    let first = service.build_lineage(&request).unwrap();
    assert!(!first.from_cache);
    assert_eq!(first.tree.root().name, "orders.status");
    let names: Vec<_> = first.tree.children(LineageTree::ROOT).map(|(_, n)| n.name.clone()).collect();
    assert_eq!(names, vec!["ship_orders"]);

    assert_eq!(service.invalidate_project("p1").unwrap(), 1);
    let again = service.build_lineage(&request).unwrap();
    assert!(!again.from_cache);
}

#[test]
fn etl_targets_follow_the_runtime_flag() {
    let db = setup_db();
    seed_graph(&db);
    db.with_writer(|c| {
        table_flows::insert_flow(c, "p1", &TableFlow {
            source_table: "orders".into(),
            target_table: "order_history".into(),
            procedure_name: Some("load_orders".into()),
            flow_sequence: 1,
            flow_type: Some("ARCHIVE".into()),
        })
    })
    .unwrap();
    let service = LineageService::from_config(Arc::new(db), &DbLineageConfig::default());
    let request = LineageRequest::table(vec!["p1".into()], "orders");

    let plain = service.build_lineage(&request).unwrap();
    assert!(plain.tree.nodes().all(|(_, n)| n.name != "order_history"));

    service.set_config_entry(ETL_FLAG_KEY, "true", true).unwrap();
    assert!(service.config().unwrap().etl_enabled);
    let extended = service.build_lineage(&request.clone().regenerate(true)).unwrap();
    let (id, target) = extended
        .tree
        .nodes()
        .find(|(_, n)| n.name == "order_history")
        .unwrap();
    assert_eq!(target.description.as_deref(), Some("ETL: ARCHIVE"));
    let parent = target.parent.and_then(|p| extended.tree.get(p)).unwrap();
    assert_eq!(parent.name, "load_orders");
    assert_eq!(extended.tree.children(id).count(), 0);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Fault {
    /// Table columns cannot be read.
    TableColumns,
    /// The report is closed by someone else before the result is published.
    ReportClosed,
}

/// Delegates to a real database, failing in one place.
struct FaultyStore {
    inner: DatabaseManager,
    fault: Fault,
}

impl LineageStore for FaultyStore {
    fn config_entries(&self) -> Result<Vec<ConfigEntry>, StorageError> {
        self.inner.config_entries()
    }

    fn set_config_entry(&self, key: &str, value: &str, is_active: bool) -> Result<(), StorageError> {
        self.inner.set_config_entry(key, value, is_active)
    }

    fn find_result(&self, scope: &LineageScope) -> Result<Option<StoredLineage>, StorageError> {
        self.inner.find_result(scope)
    }

    fn upsert_result(&self, scope: &LineageScope, lineage_json: &str) -> Result<(), StorageError> {
        self.inner.upsert_result(scope, lineage_json)
    }

    fn delete_results_for_project(&self, project_id: &str) -> Result<usize, StorageError> {
        self.inner.delete_results_for_project(project_id)
    }

    fn open_report(&self, scope: &LineageScope) -> Result<i64, StorageError> {
        self.inner.open_report(scope)
    }

    fn complete_report(&self, report_id: i64, lineage_json: &str) -> Result<(), StorageError> {
        self.inner.complete_report(report_id, lineage_json)
    }

    fn fail_report(&self, report_id: i64, error: &str) -> Result<(), StorageError> {
        self.inner.fail_report(report_id, error)
    }

    fn publish_result(&self, report_id: i64, scope: &LineageScope, lineage_json: &str) -> Result<(), StorageError> {
        if self.fault == Fault::ReportClosed {
            self.inner.fail_report(report_id, "closed elsewhere")?;
        }
        self.inner.publish_result(report_id, scope, lineage_json)
    }

    fn has_component_graph(&self, project_ids: &[String]) -> Result<bool, StorageError> {
        self.inner.has_component_graph(project_ids)
    }

    fn referencing_components(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError> {
        self.inner.referencing_components(scope)
    }

    fn call_children(&self, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError> {
        self.inner.call_children(component_id)
    }

    fn reference_children(&self, component_id: i64) -> Result<Vec<ComponentRecord>, StorageError> {
        self.inner.reference_children(component_id)
    }

    fn usage_files(&self, scope: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError> {
        self.inner.usage_files(scope)
    }

    fn table_columns(&self, project_ids: &[String], table: &str) -> Result<Vec<ColumnInfo>, StorageError> {
        if self.fault == Fault::TableColumns {
            return Err(StorageError::SqliteError {
                message: "disk I/O error".to_string(),
            });
        }
        self.inner.table_columns(project_ids, table)
    }

    fn tables_overview(&self, project_ids: &[String]) -> Result<Vec<TableOverview>, StorageError> {
        self.inner.tables_overview(project_ids)
    }

    fn table_flows(&self, project_ids: &[String]) -> Result<Vec<TableFlow>, StorageError> {
        self.inner.table_flows(project_ids)
    }

    fn component_source(&self, component_id: i64) -> Result<Option<ComponentSource>, StorageError> {
        self.inner.component_source(component_id)
    }

    fn projects_with_sql(&self, application_id: &str) -> Result<Vec<ProjectSummary>, StorageError> {
        self.inner.projects_with_sql(application_id)
    }
}

#[test]
fn failed_generation_is_reported_and_not_cached() {
    let db = setup_db();
    seed_graph(&db);
    let store = Arc::new(FaultyStore {
        inner: db,
        fault: Fault::TableColumns,
    });
    let service = LineageService::from_config(store, &DbLineageConfig::default());
    let request = LineageRequest::table(vec!["p1".into()], "orders");

    let err = service.build_lineage(&request).unwrap_err();
    assert!(matches!(err, LineageError::Storage(_)));
    assert!(service.cache().get_raw(&keys::lineage_key(&scope("orders"))).is_none());

    let inner = &service.store().inner;
    assert!(inner.find_result(&scope("orders")).unwrap().is_none());
    let report = inner
        .with_reader(|c| lineage_reports::latest_report(c, "p1", "orders"))
        .unwrap()
        .unwrap();
    assert_eq!(report.status, ReportStatus::Failed);
    assert!(report.error.unwrap().contains("disk I/O error"));
    assert!(report.ended_at.is_some());

    // Column-scoped trees skip the type information and still succeed.
    let column = service
        .build_lineage(&LineageRequest::column(vec!["p1".into()], "orders", "status"))
        .unwrap();
    assert!(!column.from_cache);
}

#[test]
fn result_is_not_kept_when_the_report_cannot_complete() {
    let db = setup_db();
    seed_graph(&db);
    let store = Arc::new(FaultyStore {
        inner: db,
        fault: Fault::ReportClosed,
    });
    let service = LineageService::from_config(store, &DbLineageConfig::default());
    let request = LineageRequest::table(vec!["p1".into()], "orders");

    let err = service.build_lineage(&request).unwrap_err();
    assert!(matches!(err, LineageError::Storage(_)));
    assert!(service.cache().get_raw(&keys::lineage_key(&scope("orders"))).is_none());

    let inner = &service.store().inner;
    assert!(inner.find_result(&scope("orders")).unwrap().is_none());
    let report = inner
        .with_reader(|c| lineage_reports::latest_report(c, "p1", "orders"))
        .unwrap()
        .unwrap();
    assert_eq!(report.status, ReportStatus::Failed);
    assert!(report.lineage_json.is_none());

    // The next request generates again instead of serving a stray result.
    let err = service.build_lineage(&request).unwrap_err();
    assert!(matches!(err, LineageError::Storage(_)));
}

#[test]
fn bad_requests_are_rejected_before_any_work() {
    let service = LineageService::from_config(Arc::new(setup_db()), &DbLineageConfig::default());
    let err = service
        .build_lineage(&LineageRequest::table(vec!["p_1".into()], "orders"))
        .unwrap_err();
    assert!(matches!(err, LineageError::InvalidRequest(_)));
    let reports = service
        .store()
        .with_reader(|c| lineage_reports::latest_report(c, "p_1", "orders"))
        .unwrap();
    assert!(reports.is_none());
}
