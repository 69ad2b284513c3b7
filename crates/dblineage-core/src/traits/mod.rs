//! Seams between the analysis engine and its collaborators.

pub mod cancellation;
pub mod lineage_store;
pub mod schema_writer;
pub mod source_store;
pub mod usage_sink;

pub use cancellation::{Cancellable, CancellationToken};
pub use lineage_store::LineageStore;
pub use schema_writer::SchemaWriter;
pub use source_store::SourceStore;
pub use usage_sink::UsageSink;
