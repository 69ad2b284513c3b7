//! Per-file column usage tracing and the streaming trace run.

use std::time::Instant;

use crossbeam_channel::bounded;
use dblineage_core::config::TraceConfig;
use dblineage_core::errors::TraceError;
use dblineage_core::traits::{Cancellable, UsageSink};
use dblineage_core::types::collections::{FxHashMap, FxHashSet};
use dblineage_core::types::{ColumnRef, NewColumnUsage, SourceFile, UsageType};
use rayon::prelude::*;

use super::classify::{classify_usage, is_comment};
use super::variants::VariantIndex;
use crate::orm::OrmRegistry;

/// Bound on in-flight usages between the scanning workers and the sink.
const CHANNEL_CAPACITY: usize = 1024;

/// Options for one trace run.
#[derive(Default, Clone, Copy)]
pub struct TraceOptions<'a> {
    /// Retrace files already marked parsed.
    pub force: bool,
    pub cancel: Option<&'a (dyn Cancellable + Sync)>,
}

impl TraceOptions<'_> {
    fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|c| c.is_cancelled())
    }
}

/// Outcome of a trace run.
#[derive(Debug, Default)]
pub struct TraceSummary {
    pub files_traced: usize,
    pub files_skipped: usize,
    /// Usages produced by the scan, before storage-level deduplication.
    pub usages_found: usize,
    pub usages_recorded: usize,
    pub cancelled: bool,
    pub errors: Vec<TraceError>,
}

impl TraceSummary {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Traces column usages in source files against one project's columns.
pub struct ColumnTracer<'r> {
    index: VariantIndex,
    registry: &'r OrmRegistry,
    config: TraceConfig,
}

impl<'r> ColumnTracer<'r> {
    pub fn new(columns: &[ColumnRef], registry: &'r OrmRegistry, config: &TraceConfig) -> Self {
        Self {
            index: VariantIndex::build(columns, config),
            registry,
            config: config.clone(),
        }
    }

    pub fn index(&self) -> &VariantIndex {
        &self.index
    }

    /// Scan one file and collect its usages, deduplicated.
    pub fn trace_file(&self, file: &SourceFile) -> Vec<NewColumnUsage> {
        let mut usages = Vec::new();
        self.scan_file(file, |usage| usages.push(usage));
        usages
    }

    /// Scan one file line by line, handing each new usage to `emit` as soon
    /// as it is found.
    pub fn scan_file<F>(&self, file: &SourceFile, mut emit: F)
    where
        F: FnMut(NewColumnUsage),
    {
        if self.index.is_empty() || file.content.is_empty() {
            return;
        }
        let orms = self.registry.detect(&file.content, file.language);
        let fields = OrmRegistry::field_mappings(&file.content, &orms);
        let lines: Vec<&str> = file.content.lines().collect();
        let mut seen: FxHashSet<(i64, u32, UsageType, bool)> = FxHashSet::default();

        let min_match_len = self.config.effective_min_match_len();
        let distinctive = self.config.effective_distinctive_name_len();

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }
            let line_number = (i + 1) as u32;
            let mut window: Option<Window> = None;

            for col in self.index.find_columns(line) {
                let target = self.index.column(col);
                if target.name.chars().count() < min_match_len {
                    continue;
                }
                let window = window.get_or_insert_with(|| self.window(&lines, i));
                let accepted = !orms.is_empty()
                    || target.name.chars().count() >= distinctive
                    || self.index.table_mentioned(target, &window.context_lower);
                if !accepted {
                    continue;
                }
                let usage_type = classify_usage(line, &window.context, &orms);
                if seen.insert((target.column_id, line_number, usage_type, false)) {
                    emit(self.usage(file, target.column_id, line_number, usage_type, window));
                }
            }

            if fields.is_empty() {
                continue;
            }
            let line_lower = line.to_lowercase();
            for (field, column) in &fields {
                if !VariantIndex::field_in_line(field, &line_lower) {
                    continue;
                }
                for &col in self.index.columns_named(column) {
                    let target = self.index.column(col);
                    let window = window.get_or_insert_with(|| self.window(&lines, i));
                    let usage_type = classify_usage(line, &window.context, &orms);
                    if seen.insert((target.column_id, line_number, usage_type, true)) {
                        emit(self.usage(file, target.column_id, line_number, usage_type, window));
                    }
                }
            }
        }
    }

    fn window(&self, lines: &[&str], i: usize) -> Window {
        let context_radius = self.config.effective_context_radius();
        let snippet_radius = self.config.effective_snippet_radius();
        let context = join_window(lines, i, context_radius);
        Window {
            context_lower: context.to_lowercase(),
            context,
            snippet: join_window(lines, i, snippet_radius),
        }
    }

    fn usage(
        &self,
        file: &SourceFile,
        column_id: i64,
        line_number: u32,
        usage_type: UsageType,
        window: &Window,
    ) -> NewColumnUsage {
        NewColumnUsage {
            column_id,
            source_file_id: file.id,
            line_number,
            usage_type,
            code_snippet: truncate_chars(&window.snippet, self.config.effective_snippet_max_chars()),
            context: truncate_chars(&window.context, self.config.effective_context_max_chars()),
        }
    }

    /// Trace `files`, streaming usages into `sink` as they are found. A file
    /// is marked parsed only once all of its usages were stored. Files
    /// already parsed are skipped unless `options.force` is set.
    pub fn trace<S>(&self, files: &[SourceFile], sink: &S, options: TraceOptions<'_>) -> TraceSummary
    where
        S: UsageSink + ?Sized,
    {
        let start = Instant::now();
        let pending: Vec<&SourceFile> = files.iter().filter(|f| options.force || !f.parsed).collect();
        let mut writer = SinkWriter::new(sink, files.len() - pending.len());

        if self.config.effective_parallel() && pending.len() > 1 {
            self.trace_parallel(&pending, &mut writer, options);
        } else {
            for file in &pending {
                if options.is_cancelled() {
                    writer.cancel(file);
                    continue;
                }
                self.scan_file(file, |usage| writer.record(file, usage));
                writer.finish(file);
            }
        }

        let summary = writer.into_summary();
        tracing::info!(
            files_traced = summary.files_traced,
            files_skipped = summary.files_skipped,
            usages_found = summary.usages_found,
            usages_recorded = summary.usages_recorded,
            errors = summary.errors.len(),
            cancelled = summary.cancelled,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "column trace complete"
        );
        summary
    }

    fn trace_parallel<S>(&self, pending: &[&SourceFile], writer: &mut SinkWriter<'_, S>, options: TraceOptions<'_>)
    where
        S: UsageSink + ?Sized,
    {
        let (tx, rx) = bounded::<TraceEvent>(CHANNEL_CAPACITY);
        let by_id: FxHashMap<i64, &SourceFile> = pending.iter().map(|f| (f.id, *f)).collect();

        std::thread::scope(|scope| {
            scope.spawn(move || {
                pending.par_iter().for_each_with(tx, |tx, file| {
                    if options.is_cancelled() {
                        let _ = tx.send(TraceEvent::Cancelled(file.id));
                        return;
                    }
                    self.scan_file(file, |usage| {
                        let _ = tx.send(TraceEvent::Usage(usage));
                    });
                    let _ = tx.send(TraceEvent::Done(file.id));
                });
            });

            for event in rx {
                match event {
                    TraceEvent::Usage(usage) => {
                        if let Some(file) = by_id.get(&usage.source_file_id) {
                            writer.record(file, usage);
                        }
                    }
                    TraceEvent::Done(id) => {
                        if let Some(file) = by_id.get(&id) {
                            writer.finish(file);
                        }
                    }
                    TraceEvent::Cancelled(id) => {
                        if let Some(file) = by_id.get(&id) {
                            writer.cancel(file);
                        }
                    }
                }
            }
        });
    }
}

struct Window {
    context: String,
    context_lower: String,
    snippet: String,
}

enum TraceEvent {
    Usage(NewColumnUsage),
    Done(i64),
    Cancelled(i64),
}

/// Owns the sink side of a run. Lives on the calling thread.
struct SinkWriter<'s, S: ?Sized> {
    sink: &'s S,
    failed: FxHashSet<i64>,
    summary: TraceSummary,
}

impl<'s, S: UsageSink + ?Sized> SinkWriter<'s, S> {
    fn new(sink: &'s S, skipped: usize) -> Self {
        Self {
            sink,
            failed: FxHashSet::default(),
            summary: TraceSummary {
                files_skipped: skipped,
                ..TraceSummary::default()
            },
        }
    }

    fn record(&mut self, file: &SourceFile, usage: NewColumnUsage) {
        self.summary.usages_found += 1;
        if self.failed.contains(&file.id) {
            return;
        }
        match self.sink.record_usage(&usage) {
            Ok(true) => self.summary.usages_recorded += 1,
            Ok(false) => {}
            Err(source) => {
                tracing::warn!(path = %file.path, error = %source, "failed to record usage");
                self.failed.insert(file.id);
                self.summary.errors.push(TraceError::Sink {
                    path: file.path.clone(),
                    source,
                });
            }
        }
    }

    fn finish(&mut self, file: &SourceFile) {
        self.summary.files_traced += 1;
        if self.failed.contains(&file.id) {
            return;
        }
        if let Err(source) = self.sink.mark_parsed(file.id) {
            tracing::warn!(path = %file.path, error = %source, "failed to mark file parsed");
            self.summary.errors.push(TraceError::MarkParsed {
                path: file.path.clone(),
                source,
            });
        }
    }

    fn cancel(&mut self, file: &SourceFile) {
        tracing::debug!(path = %file.path, "trace cancelled before file");
        self.summary.files_skipped += 1;
        if !self.summary.cancelled {
            self.summary.cancelled = true;
            self.summary.errors.push(TraceError::Cancelled);
        }
    }

    fn into_summary(self) -> TraceSummary {
        self.summary
    }
}

fn join_window(lines: &[&str], i: usize, radius: usize) -> String {
    let start = i.saturating_sub(radius);
    let end = (i + radius + 1).min(lines.len());
    lines[start..end].join("\n")
}

/// Cut `text` to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte, _)) => text[..byte].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dblineage_core::types::Language;
    use std::cell::RefCell;

    fn column(id: i64, table: &str, name: &str) -> ColumnRef {
        ColumnRef {
            id,
            name: name.to_string(),
            table: table.to_string(),
        }
    }

    fn file(id: i64, path: &str, content: &str) -> SourceFile {
        SourceFile {
            id,
            project_id: "p1".to_string(),
            path: path.to_string(),
            language: Language::from_path(path),
            content: content.to_string(),
            parsed: false,
        }
    }

    #[derive(Default)]
    struct MemorySink {
        rows: RefCell<Vec<NewColumnUsage>>,
        parsed: RefCell<Vec<i64>>,
    }

    impl UsageSink for MemorySink {
        fn record_usage(&self, usage: &NewColumnUsage) -> Result<bool, dblineage_core::errors::StorageError> {
            let mut rows = self.rows.borrow_mut();
            let dup = rows.iter().any(|r| {
                r.column_id == usage.column_id
                    && r.source_file_id == usage.source_file_id
                    && r.line_number == usage.line_number
                    && r.usage_type == usage.usage_type
            });
            if !dup {
                rows.push(usage.clone());
            }
            Ok(!dup)
        }

        fn mark_parsed(&self, source_file_id: i64) -> Result<(), dblineage_core::errors::StorageError> {
            self.parsed.borrow_mut().push(source_file_id);
            Ok(())
        }
    }

    #[test]
    fn traces_distinctive_column_with_snippet() {
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "users", "email")], &registry, &TraceConfig::default());
        let src = "function load(db) {\n  const rows = db.query(\"SELECT email FROM users WHERE active\");\n  return rows;\n}";
        let usages = tracer.trace_file(&file(1, "src/load.js", src));
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].line_number, 2);
        assert_eq!(usages[0].usage_type, UsageType::Filter);
        assert!(usages[0].code_snippet.starts_with("function load"));
    }

    #[test]
    fn short_names_need_table_context() {
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "orders", "code")], &registry, &TraceConfig::default());
        assert!(tracer.trace_file(&file(1, "a.js", "const code = 1;")).is_empty());
        let with_table = tracer.trace_file(&file(2, "b.js", "const order = load();\nconst c = order.code;"));
        assert_eq!(with_table.len(), 1);
        assert_eq!(with_table[0].line_number, 2);
    }

    #[test]
    fn three_letter_names_are_never_matched() {
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "users", "id")], &registry, &TraceConfig::default());
        let src = "SELECT users.id FROM users WHERE users.id = 1";
        assert!(tracer.trace_file(&file(1, "q.sql", src)).is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "users", "email")], &registry, &TraceConfig::default());
        let src = "// email here\n\n# email\n-- email\n * email";
        assert!(tracer.trace_file(&file(1, "a.py", src)).is_empty());
    }

    #[test]
    fn snippet_and_context_are_truncated() {
        let config = TraceConfig {
            snippet_max_chars: Some(10),
            context_max_chars: Some(12),
            ..TraceConfig::default()
        };
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "users", "email")], &registry, &config);
        let usages = tracer.trace_file(&file(1, "a.js", "const émail_x = 1;\nuser.email = 'x@y.z';"));
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].code_snippet.chars().count(), 10);
        assert_eq!(usages[0].context.chars().count(), 12);
    }

    #[test]
    fn sequential_run_streams_and_marks_parsed() {
        let config = TraceConfig {
            parallel: Some(false),
            ..TraceConfig::default()
        };
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "users", "email")], &registry, &config);
        let mut done = file(2, "b.js", "send(user.email)");
        done.parsed = true;
        let files = vec![file(1, "a.js", "send(user.email)"), done];
        let sink = MemorySink::default();

        let summary = tracer.trace(&files, &sink, TraceOptions::default());
        assert_eq!(summary.files_traced, 1);
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.usages_recorded, 1);
        assert_eq!(sink.parsed.borrow().as_slice(), &[1]);

        let again = tracer.trace(&files, &sink, TraceOptions { force: true, cancel: None });
        assert_eq!(again.files_traced, 2);
        assert_eq!(again.usages_recorded, 1);
        assert_eq!(sink.rows.borrow().len(), 2);
    }

    #[test]
    fn cancelled_run_traces_nothing() {
        use dblineage_core::traits::CancellationToken;
        let registry = OrmRegistry::empty();
        let tracer = ColumnTracer::new(&[column(10, "users", "email")], &registry, &TraceConfig::default());
        let token = CancellationToken::new();
        token.cancel();
        let files = vec![file(1, "a.js", "user.email"), file(2, "b.js", "user.email")];
        let sink = MemorySink::default();
        let summary = tracer.trace(&files, &sink, TraceOptions { force: false, cancel: Some(&token) });
        assert!(summary.cancelled);
        assert_eq!(summary.files_traced, 0);
        assert_eq!(summary.files_skipped, 2);
        assert!(sink.rows.borrow().is_empty());
    }
}
