//! Ingestion: store files, extract and persist schema, trace usages.

use std::time::Instant;

use dblineage_core::config::TraceConfig;
use dblineage_core::errors::{PipelineError, PipelineResult};
use dblineage_core::traits::{Cancellable, SchemaWriter, SourceStore, UsageSink};
use dblineage_core::types::{NewSourceFile, ParsedTable};

use crate::orm::OrmRegistry;
use crate::scanner::{is_code_file, is_orm_schema_file, is_schema_file};
use crate::schema::{extract_orm_schema, extract_sql_schema, persist_tables, PersistSummary};
use crate::trace::{ColumnTracer, TraceOptions, TraceSummary};

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub files_stored: usize,
    /// Files that are not source code and were not stored.
    pub files_ignored: usize,
    pub schema_files: usize,
    pub model_files: usize,
    pub tables_created: usize,
    pub tables_skipped: usize,
    pub columns_written: usize,
    pub trace: TraceSummary,
}

impl IngestSummary {
    fn absorb(&mut self, persisted: PersistSummary) {
        self.tables_created += persisted.tables_created;
        self.tables_skipped += persisted.tables_skipped;
        self.columns_written += persisted.columns_written;
    }
}

/// Runs ingestion batches for one store. Per-file failures are collected on
/// the result; only a failure to list the project's files or columns stops
/// tracing.
pub struct IngestPipeline<'a, S: ?Sized> {
    store: &'a S,
    registry: &'a OrmRegistry,
    trace_config: TraceConfig,
    cancel: Option<&'a (dyn Cancellable + Sync)>,
}

impl<'a, S> IngestPipeline<'a, S>
where
    S: SourceStore + SchemaWriter + UsageSink + ?Sized,
{
    pub fn new(store: &'a S, registry: &'a OrmRegistry, trace_config: &TraceConfig) -> Self {
        Self {
            store,
            registry,
            trace_config: trace_config.clone(),
            cancel: None,
        }
    }

    pub fn with_cancellation(mut self, cancel: &'a (dyn Cancellable + Sync)) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.is_cancelled())
    }

    /// Store the code files of a batch, extract schema from SQL and model
    /// candidates (SQL first; the first definition of a table wins), then
    /// trace every unparsed file of the project.
    pub fn ingest(&self, project_id: &str, files: &[NewSourceFile]) -> PipelineResult<IngestSummary> {
        let start = Instant::now();
        let mut result = PipelineResult::new(IngestSummary::default());
        let mut sql_files: Vec<&NewSourceFile> = Vec::new();
        let mut model_files: Vec<&NewSourceFile> = Vec::new();

        for file in files {
            if self.is_cancelled() {
                result.add_error(PipelineError::Cancelled);
                return result;
            }
            if !is_code_file(&file.path) {
                result.data.files_ignored += 1;
                continue;
            }
            if let Err(e) = self.store.upsert_source_file(project_id, file) {
                tracing::warn!(path = %file.path, error = %e, "failed to store source file");
                result.add_error(e.into());
                continue;
            }
            result.data.files_stored += 1;
            if is_schema_file(&file.path) {
                sql_files.push(file);
            }
            if is_orm_schema_file(&file.path) {
                model_files.push(file);
            }
        }

        result.data.schema_files = sql_files.len();
        result.data.model_files = model_files.len();
        for file in sql_files {
            self.persist(project_id, &file.path, extract_sql_schema(&file.content), &mut result);
        }
        for file in model_files {
            self.persist(
                project_id,
                &file.path,
                extract_orm_schema(&file.content, file.language),
                &mut result,
            );
        }

        self.trace_into(project_id, false, &mut result);

        tracing::info!(
            project_id,
            files_stored = result.data.files_stored,
            tables_created = result.data.tables_created,
            columns_written = result.data.columns_written,
            usages_recorded = result.data.trace.usages_recorded,
            errors = result.error_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "ingestion complete"
        );
        result
    }

    /// Trace the project again. With `force`, existing usages are dropped
    /// and every file is traced from scratch.
    pub fn retrace(&self, project_id: &str, force: bool) -> PipelineResult<IngestSummary> {
        let mut result = PipelineResult::new(IngestSummary::default());
        if force {
            if let Err(e) = self.store.reset_trace(project_id) {
                result.add_error(e.into());
                return result;
            }
        }
        self.trace_into(project_id, force, &mut result);
        result
    }

    fn persist(
        &self,
        project_id: &str,
        path: &str,
        tables: Vec<ParsedTable>,
        result: &mut PipelineResult<IngestSummary>,
    ) {
        if tables.is_empty() {
            return;
        }
        match persist_tables(self.store, project_id, &tables) {
            Ok(persisted) => result.data.absorb(persisted),
            Err(e) => {
                tracing::warn!(path, error = %e, "failed to persist extracted schema");
                result.add_error(e.into());
            }
        }
    }

    fn trace_into(&self, project_id: &str, force: bool, result: &mut PipelineResult<IngestSummary>) {
        if self.is_cancelled() {
            result.add_error(PipelineError::Cancelled);
            return;
        }
        let columns = match self.store.project_columns(project_id) {
            Ok(columns) => columns,
            Err(e) => {
                result.add_error(e.into());
                return;
            }
        };
        if columns.is_empty() {
            tracing::info!(project_id, "no columns extracted, skipping trace");
            return;
        }
        let files = match self.store.project_files(project_id) {
            Ok(files) => files,
            Err(e) => {
                result.add_error(e.into());
                return;
            }
        };

        let tracer = ColumnTracer::new(&columns, self.registry, &self.trace_config);
        let mut summary = tracer.trace(
            &files,
            self.store,
            TraceOptions {
                force,
                cancel: self.cancel,
            },
        );
        for error in summary.errors.drain(..) {
            result.add_error(error.into());
        }
        result.data.trace = summary;
    }
}
