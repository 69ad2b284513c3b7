//! Ingestion helpers: which files get traced and which carry schema.

pub mod classify;

pub use classify::{is_code_file, is_orm_schema_file, is_schema_file};
