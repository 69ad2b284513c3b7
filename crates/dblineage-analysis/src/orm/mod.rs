//! ORM descriptor registry.
//!
//! A descriptor is plain data: file indicators, line-level usage patterns in
//! precedence order, model-to-table patterns and field-to-column patterns.
//! The tracer and extractor only ever iterate descriptors, so adding one
//! (built in or from a TOML catalog) needs no code change elsewhere.

pub mod catalog;
pub mod custom;
pub mod descriptor;
pub mod registry;

pub use custom::OrmCatalogLoader;
pub use descriptor::{FieldPattern, ModelPattern, OrmDescriptor, PatternUsage, UsagePattern};
pub use registry::OrmRegistry;
