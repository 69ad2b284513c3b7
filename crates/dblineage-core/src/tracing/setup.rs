//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for the lineage engine.
///
/// Reads `DBLINEAGE_LOG` for per-module levels, e.g.
/// `DBLINEAGE_LOG=dblineage_analysis::trace=debug,dblineage_storage=warn`.
/// Falls back to `dblineage=info` when unset or invalid.
///
/// Safe to call more than once; if the host already installed a global
/// subscriber this is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("DBLINEAGE_LOG")
            .unwrap_or_else(|_| EnvFilter::new("dblineage=info"));

        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}
