//! Tracing and logging setup shared by the shop binaries and tests.

pub mod tracing;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Initialize process-wide JSON logging.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(DEFAULT_FILTER);
}

/// Human-readable logs captured by the test harness.
pub fn init_for_tests() {
    tracing::init_test();
}
