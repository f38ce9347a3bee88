//! Tracing initialization for tests and binaries.

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing for tests with environment-based filtering.
///
/// Uses the RUST_LOG environment variable to control output, e.g.
/// `RUST_LOG=rustydarc=debug` or `RUST_LOG=rustydarc::l2=trace`.
/// Multiple calls are safe.
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("rustydarc=warn"));

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .init();
    });

    Lazy::force(&TRACING);
}

/// Initialize tracing for the decoder binary at an explicit level
/// directive; RUST_LOG still wins when set.
pub fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rustydarc={directive}")));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .init();
}
