//! Observability: `tracing` with an `EnvFilter` driven by `DBLINEAGE_LOG`.

pub mod setup;

pub use setup::init_tracing;
