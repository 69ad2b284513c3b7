//! Tests for tracing initialization.

use std::sync::Mutex;

use dblineage_core::tracing::init_tracing;

static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn accepts_per_module_filter() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("DBLINEAGE_LOG", "dblineage_analysis=debug,dblineage_storage=warn");
    init_tracing();
    std::env::remove_var("DBLINEAGE_LOG");
}

#[test]
fn repeated_initialization_is_harmless() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    tracing::info!("tracing initialized");
}
