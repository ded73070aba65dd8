//! Integration tests across layers
//!
//! Tests that span the registry, decorator commands, and instances.

mod decorated_instances;
mod extraction;

/// Routes library events to the test output; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
