//! Integration tests for the Export Apparels storefront.
//!
//! Tests live in `tests/` and exercise whole flows rather than single
//! modules: cart persistence across reopen against the file-backed slot
//! store, and the checkout flow against test sinks.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

/// Install a test tracing subscriber once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A unique scratch directory for a file-store test.
#[must_use]
pub fn scratch_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ea-it-{label}-{}", uuid::Uuid::new_v4()))
}
