//! Shared types used across storage and analysis.

pub mod collections;
pub mod language;
pub mod lineage;
pub mod schema;
pub mod usage;

pub use language::Language;
pub use lineage::{
    ComponentKey, ComponentRecord, ComponentSource, ComponentType, ConfigEntry, LineageScope,
    NodeColors, NodeType, ProjectSummary, ReportStatus, StoredLineage, TableFlow, project_set_key,
};
pub use schema::{ColumnInfo, ColumnRef, ParsedColumn, ParsedTable, TableOverview};
pub use usage::{NewColumnUsage, NewSourceFile, SourceFile, UsageType};
