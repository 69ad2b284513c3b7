//! # dblineage-storage
//!
//! SQLite persistence for extracted schema, source files, column usages,
//! the component graph, and lineage results. One serialized writer plus a
//! round-robin read pool; versioned migrations; free-function queries;
//! implementations of the core storage traits.

pub mod connection;
pub mod migrations;
pub mod queries;
pub mod store;

pub use connection::DatabaseManager;
