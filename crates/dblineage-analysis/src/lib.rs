//! # dblineage-analysis
//!
//! The lineage engine: ORM descriptor registry, schema extraction from SQL
//! DDL and ORM models, column usage tracing, lineage tree generation, the
//! cache layer, and the ingestion pipeline tying them together.

pub mod cache;
pub mod lineage;
pub mod orm;
pub mod pipeline;
pub mod scanner;
pub mod schema;
pub mod trace;

pub use lineage::{LineageRequest, LineageResponse, LineageService, LineageTree};
pub use orm::{OrmDescriptor, OrmRegistry};
pub use pipeline::{IngestPipeline, IngestSummary};
pub use schema::{extract_orm_schema, extract_sql_schema};
pub use trace::{ColumnTracer, TraceOptions, TraceSummary};
