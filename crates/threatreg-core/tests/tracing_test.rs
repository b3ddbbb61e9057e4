//! Tests for the tracing setup.

use std::sync::Mutex;

use threatreg_core::tracing::setup::init_tracing;

/// Global mutex to serialize tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_log_filter_from_env() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("THREATREG_LOG", "threatreg_registry=debug,threatreg_storage=warn");
    init_tracing();
    tracing::info!(target: "threatreg_registry", "tracing initialized");
    std::env::remove_var("THREATREG_LOG");
}

#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing();
    init_tracing();
}

#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("THREATREG_LOG", "not a [valid filter");
    init_tracing();
    std::env::remove_var("THREATREG_LOG");
}
