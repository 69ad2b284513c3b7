//! Schema extraction from SQL DDL and ORM model sources, and its
//! persistence through [`SchemaWriter`](dblineage_core::traits::SchemaWriter).

pub mod models;
pub mod persist;
pub mod scan;
pub mod sql;

pub use models::extract_orm_schema;
pub use persist::{persist_tables, PersistSummary};
pub use sql::extract_sql_schema;
