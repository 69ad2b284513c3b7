//! Request-level lineage operations: cache, persisted results, reports.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dblineage_core::config::{CacheConfig, LineageConfig, LineageSettings};
use dblineage_core::errors::LineageError;
use dblineage_core::traits::LineageStore;
use dblineage_core::types::{ComponentSource, LineageScope, ProjectSummary, TableOverview};
use dblineage_core::DbLineageConfig;

use super::builder::LineageBuilder;
use super::etl::attach_etl_flows;
use super::graph::StoreGraph;
use super::tree::{LineageTree, TypeInformation};
use crate::cache::{keys, CacheService};

/// One lineage view request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageRequest {
    pub project_ids: Vec<String>,
    pub table: String,
    pub column: Option<String>,
    /// Skip the cache and the persisted result.
    pub regenerate: bool,
}

impl LineageRequest {
    pub fn table(project_ids: Vec<String>, table: impl Into<String>) -> Self {
        Self {
            project_ids,
            table: table.into(),
            column: None,
            regenerate: false,
        }
    }

    pub fn column(project_ids: Vec<String>, table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            column: Some(column.into()),
            ..Self::table(project_ids, table)
        }
    }

    pub fn regenerate(mut self, regenerate: bool) -> Self {
        self.regenerate = regenerate;
        self
    }

    fn scope(&self) -> Result<LineageScope, LineageError> {
        validate_project_ids(&self.project_ids)?;
        let table = self.table.trim();
        if table.is_empty() {
            return Err(LineageError::InvalidRequest("table name is required".to_string()));
        }
        let column = self.column.as_deref().map(str::trim).map(str::to_string);
        Ok(LineageScope::new(self.project_ids.clone(), table, column))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageResponse {
    pub tree: LineageTree,
    /// Served from the cache or a persisted result rather than generated.
    pub from_cache: bool,
}

fn validate_project_ids(project_ids: &[String]) -> Result<(), LineageError> {
    if project_ids.is_empty() {
        return Err(LineageError::InvalidRequest("at least one project id is required".to_string()));
    }
    if let Some(bad) = project_ids.iter().find(|id| !is_valid_project_id(id)) {
        return Err(LineageError::InvalidRequest(format!(
            "invalid project id {bad:?}: expected ASCII letters, digits, '-' or '.'"
        )));
    }
    Ok(())
}

/// Ids are embedded in cache keys and invalidation patterns, where `_`
/// separates project sets and `:` separates key parts.
fn is_valid_project_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
}

/// Lineage operations over a store and a cache. Holds no per-request
/// state, so one instance may serve concurrent requests.
pub struct LineageService<S> {
    store: Arc<S>,
    cache: CacheService,
    settings: LineageSettings,
    cache_config: CacheConfig,
}

impl<S: LineageStore> LineageService<S> {
    pub fn new(store: Arc<S>, cache: CacheService, settings: LineageSettings, cache_config: CacheConfig) -> Self {
        Self {
            store,
            cache,
            settings,
            cache_config,
        }
    }

    pub fn from_config(store: Arc<S>, config: &DbLineageConfig) -> Self {
        Self::new(
            store,
            CacheService::from_config(&config.cache),
            config.lineage.clone(),
            config.cache.clone(),
        )
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &CacheService {
        &self.cache
    }

    /// Runtime lineage configuration: control entries over static settings,
    /// cached under `config:lineage`.
    pub fn config(&self) -> Result<LineageConfig, LineageError> {
        let key = keys::lineage_config_key();
        if let Some(config) = self.cache.get_json::<LineageConfig>(&key) {
            return Ok(config);
        }
        let entries = self.store.config_entries()?;
        let config = LineageConfig::resolve(&self.settings, &entries);
        let ttl = Duration::from_secs(self.cache_config.effective_config_ttl_secs());
        self.cache.set_json(&key, &config, Some(ttl));
        Ok(config)
    }

    /// Serve a lineage tree: cache, then persisted result, then a fresh
    /// generation recorded in a report. `regenerate` goes straight to
    /// generation.
    pub fn build_lineage(&self, request: &LineageRequest) -> Result<LineageResponse, LineageError> {
        let scope = request.scope()?;
        let config = self.config()?;
        let key = keys::lineage_key(&scope);
        let ttl = Some(Duration::from_secs(config.cache_ttl_secs));

        if !request.regenerate {
            if let Some(tree) = self.cached_tree(&key) {
                tracing::debug!(key = %key, "lineage cache hit");
                return Ok(LineageResponse { tree, from_cache: true });
            }
            if let Some(stored) = self.store.find_result(&scope)? {
                match LineageTree::from_json(&stored.lineage_json) {
                    Ok(tree) => {
                        tracing::debug!(key = %key, "persisted lineage hit");
                        self.cache.set_raw(&key, stored.lineage_json, ttl);
                        return Ok(LineageResponse { tree, from_cache: true });
                    }
                    Err(e) => {
                        tracing::warn!(key = %key, error = %e, "persisted lineage unreadable, regenerating")
                    }
                }
            }
        }

        let report_id = self.store.open_report(&scope)?;
        let start = Instant::now();
        tracing::info!(key = %key, report_id, "generating lineage");

        match self.generate_and_persist(&scope, &config, report_id) {
            Ok((tree, json)) => {
                self.cache.set_raw(&key, json, ttl);
                tracing::info!(
                    key = %key,
                    report_id,
                    nodes = tree.len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "lineage completed"
                );
                Ok(LineageResponse { tree, from_cache: false })
            }
            Err(e) => {
                tracing::error!(key = %key, report_id, error = %e, "lineage generation failed");
                if let Err(report_err) = self.store.fail_report(report_id, &e.to_string()) {
                    tracing::warn!(report_id, error = %report_err, "failed to record lineage failure");
                }
                Err(e)
            }
        }
    }

    fn cached_tree(&self, key: &str) -> Option<LineageTree> {
        let raw = self.cache.get_raw(key)?;
        match LineageTree::from_json(&raw) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!(key, error = %e, "dropping unreadable cached lineage");
                self.cache.delete(key);
                None
            }
        }
    }

    fn generate_and_persist(
        &self,
        scope: &LineageScope,
        config: &LineageConfig,
        report_id: i64,
    ) -> Result<(LineageTree, String), LineageError> {
        let tree = self.generate(scope, config)?;
        let json = tree.to_json()?;
        self.store.publish_result(report_id, scope, &json)?;
        Ok((tree, json))
    }

    /// Build the tree for `scope` without touching cache, results or reports.
    pub fn generate(&self, scope: &LineageScope, config: &LineageConfig) -> Result<LineageTree, LineageError> {
        let graph = StoreGraph::new(self.store.as_ref(), &scope.project_ids)?;
        let mut tree = LineageBuilder::new(&graph, &config.node_colors, config.max_hierarchy_depth).build(scope)?;

        if scope.column.is_none() {
            let columns = self.store.table_columns(&scope.project_ids, &scope.table)?;
            tree.set_type_information(LineageTree::ROOT, TypeInformation::from_columns(&columns));
        }
        if config.etl_enabled {
            let flows = self.store.table_flows(&scope.project_ids)?;
            attach_etl_flows(&mut tree, &scope.table, &flows, &config.node_colors);
        }
        Ok(tree)
    }

    /// Tables of the projects with their sorted columns.
    pub fn tables(&self, project_ids: &[String], regenerate: bool) -> Result<Vec<TableOverview>, LineageError> {
        validate_project_ids(project_ids)?;
        let key = keys::tables_key(project_ids);
        if !regenerate {
            if let Some(tables) = self.cache.get_json::<Vec<TableOverview>>(&key) {
                return Ok(tables);
            }
        }
        let tables = self.store.tables_overview(project_ids)?;
        let ttl = Duration::from_secs(self.config()?.cache_ttl_secs);
        self.cache.set_json(&key, &tables, Some(ttl));
        Ok(tables)
    }

    /// Projects of an application that contain SQL sources.
    pub fn schemas_by_app(&self, application_id: &str) -> Result<Vec<ProjectSummary>, LineageError> {
        let key = keys::schemas_by_app_key(application_id);
        if let Some(projects) = self.cache.get_json::<Vec<ProjectSummary>>(&key) {
            return Ok(projects);
        }
        let projects = self.store.projects_with_sql(application_id)?;
        let ttl = Duration::from_secs(self.config()?.cache_ttl_secs);
        self.cache.set_json(&key, &projects, Some(ttl));
        Ok(projects)
    }

    pub fn component_source(&self, component_id: i64) -> Result<Option<ComponentSource>, LineageError> {
        let key = keys::component_source_key(component_id);
        if let Some(source) = self.cache.get_json::<ComponentSource>(&key) {
            return Ok(Some(source));
        }
        let source = self.store.component_source(component_id)?;
        if let Some(source) = &source {
            let ttl = Duration::from_secs(self.cache_config.effective_source_ttl_secs());
            self.cache.set_json(&key, source, Some(ttl));
        }
        Ok(source)
    }

    /// Drop cached entries involving the project and its persisted results.
    /// Returns the number of results deleted.
    pub fn invalidate_project(&self, project_id: &str) -> Result<usize, LineageError> {
        validate_project_ids(&[project_id.to_string()])?;
        let cache_entries = self.cache.invalidate_project(project_id);
        let results = self.store.delete_results_for_project(project_id)?;
        tracing::info!(project_id, cache_entries, results, "invalidated project lineage");
        Ok(results)
    }

    pub fn set_config_entry(&self, key: &str, value: &str, is_active: bool) -> Result<(), LineageError> {
        self.store.set_config_entry(key, value, is_active)?;
        self.cache.delete(&keys::lineage_config_key());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_validated() {
        let err = LineageRequest::table(vec![], "orders").scope().unwrap_err();
        assert!(matches!(err, LineageError::InvalidRequest(_)));
        let err = LineageRequest::table(vec!["p_1".into()], "orders").scope().unwrap_err();
        assert!(matches!(err, LineageError::InvalidRequest(_)));
        let err = LineageRequest::table(vec!["p1".into()], "  ").scope().unwrap_err();
        assert!(matches!(err, LineageError::InvalidRequest(_)));

        let scope = LineageRequest::column(vec!["p2".into(), "p1".into()], " orders ", "total")
            .scope()
            .unwrap();
        assert_eq!(scope.table, "orders");
        assert_eq!(scope.project_key(), "p1_p2");
        assert_eq!(scope.column_key(), "total");
    }

    #[test]
    fn invalidation_rejects_bad_project_ids() {
        use dblineage_core::errors::StorageError;
        use dblineage_core::types::{
            ColumnInfo, ComponentRecord, ComponentSource, ConfigEntry, StoredLineage, TableFlow,
        };

        struct Untouchable;

        impl LineageStore for Untouchable {
            fn config_entries(&self) -> Result<Vec<ConfigEntry>, StorageError> {
                unreachable!()
            }
            fn set_config_entry(&self, _: &str, _: &str, _: bool) -> Result<(), StorageError> {
                unreachable!()
            }
            fn find_result(&self, _: &LineageScope) -> Result<Option<StoredLineage>, StorageError> {
                unreachable!()
            }
            fn upsert_result(&self, _: &LineageScope, _: &str) -> Result<(), StorageError> {
                unreachable!()
            }
            fn delete_results_for_project(&self, _: &str) -> Result<usize, StorageError> {
                unreachable!()
            }
            fn open_report(&self, _: &LineageScope) -> Result<i64, StorageError> {
                unreachable!()
            }
            fn complete_report(&self, _: i64, _: &str) -> Result<(), StorageError> {
                unreachable!()
            }
            fn fail_report(&self, _: i64, _: &str) -> Result<(), StorageError> {
                unreachable!()
            }
            fn publish_result(&self, _: i64, _: &LineageScope, _: &str) -> Result<(), StorageError> {
                unreachable!()
            }
            fn has_component_graph(&self, _: &[String]) -> Result<bool, StorageError> {
                unreachable!()
            }
            fn referencing_components(&self, _: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError> {
                unreachable!()
            }
            fn call_children(&self, _: i64) -> Result<Vec<ComponentRecord>, StorageError> {
                unreachable!()
            }
            fn reference_children(&self, _: i64) -> Result<Vec<ComponentRecord>, StorageError> {
                unreachable!()
            }
            fn usage_files(&self, _: &LineageScope) -> Result<Vec<ComponentRecord>, StorageError> {
                unreachable!()
            }
            fn table_columns(&self, _: &[String], _: &str) -> Result<Vec<ColumnInfo>, StorageError> {
                unreachable!()
            }
            fn tables_overview(&self, _: &[String]) -> Result<Vec<TableOverview>, StorageError> {
                unreachable!()
            }
            fn table_flows(&self, _: &[String]) -> Result<Vec<TableFlow>, StorageError> {
                unreachable!()
            }
            fn component_source(&self, _: i64) -> Result<Option<ComponentSource>, StorageError> {
                unreachable!()
            }
            fn projects_with_sql(&self, _: &str) -> Result<Vec<ProjectSummary>, StorageError> {
                unreachable!()
            }
        }

        let service = LineageService::from_config(Arc::new(Untouchable), &DbLineageConfig::default());
        service.cache().set_raw("lineage:p1:orders:ALL", "{}".to_string(), None);
        for id in ["*", "", "p_1", "p[1", "a:b"] {
            let err = service.invalidate_project(id).unwrap_err();
            assert!(matches!(err, LineageError::InvalidRequest(_)), "{id:?}");
        }
        assert!(service.cache().get_raw("lineage:p1:orders:ALL").is_some());
    }
}
