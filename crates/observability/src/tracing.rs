//! Subscriber initialization.

use tracing_subscriber::EnvFilter;

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// JSON logs with timestamps, filtered by `RUST_LOG` (falls back to `default`).
pub fn init(default: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(default))
        .json()
        .with_current_span(true)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Compact output routed through the test writer so `cargo test` captures it.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_test_writer()
        .compact()
        .try_init();
}
