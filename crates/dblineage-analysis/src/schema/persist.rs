//! Writing extracted tables through a [`SchemaWriter`].

use dblineage_core::errors::StorageError;
use dblineage_core::traits::SchemaWriter;
use dblineage_core::types::ParsedTable;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistSummary {
    pub tables_created: usize,
    /// Tables that already existed in the project and were left alone.
    pub tables_skipped: usize,
    pub columns_written: usize,
}

/// Insert each table if the project does not have it yet, then its columns.
/// The first definition of a table name wins; later ones are ignored whole.
pub fn persist_tables<W: SchemaWriter + ?Sized>(
    writer: &W,
    project_id: &str,
    tables: &[ParsedTable],
) -> Result<PersistSummary, StorageError> {
    let mut summary = PersistSummary::default();
    for table in tables {
        let Some(table_id) = writer.insert_table_if_absent(project_id, &table.name)? else {
            tracing::debug!(table = %table.name, "table already defined; keeping first definition");
            summary.tables_skipped += 1;
            continue;
        };
        for column in &table.columns {
            writer.insert_column(table_id, column)?;
            summary.columns_written += 1;
        }
        summary.tables_created += 1;
    }
    Ok(summary)
}
