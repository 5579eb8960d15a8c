//! # Tracing subscriber setup.
//!
//! Level conventions used across the crate:
//! - ERROR: entering the fatal halt state
//! - WARN: retried failures (bring-up attempts, spin errors, dropped events)
//! - INFO: lifecycle milestones, one health line per spin, one clock line per indicator cycle
//! - DEBUG: collaborator detail (driver init, on-bus log echoes)
//!
//! Filtering follows `RUST_LOG`; the default directive differs per entry point.

use tracing_subscriber::EnvFilter;

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Human-readable output, `info` unless `RUST_LOG` says otherwise.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(filter_or("info")).init();
}

/// JSON lines, one object per event.
pub fn init_json() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter_or("info"))
        .init();
}

/// Picks [`init_json`] when `RUST_LOG_FORMAT=json`, [`init`] otherwise.
pub fn init_from_env() {
    match std::env::var("RUST_LOG_FORMAT") {
        Ok(fmt) if fmt.eq_ignore_ascii_case("json") => init_json(),
        _ => init(),
    }
}

/// Test writer at `debug`; safe to call from every test.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or("debug"))
        .with_test_writer()
        .try_init();
}
