//! Column usage tracing.
//!
//! A trace run builds one [`VariantIndex`] over the project's columns, then
//! scans files line by line. Files are scanned in parallel; usages stream
//! back to the calling thread, which owns the [`UsageSink`] and writes them
//! as they arrive.
//!
//! [`UsageSink`]: dblineage_core::traits::UsageSink

pub mod classify;
pub mod matcher;
pub mod tracer;
pub mod variants;

pub use classify::{classify_usage, keyword_usage};
pub use tracer::{ColumnTracer, TraceOptions, TraceSummary};
pub use variants::VariantIndex;
