//! Core storage traits implemented over `DatabaseManager`.
//! Writes go through the serialized writer; reads through the pool.

mod lineage_store;
mod schema_writer;
mod source_store;
mod usage_sink;
