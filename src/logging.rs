//! Tracing subscriber setup.

use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// Installs the process-wide tracing subscriber.
///
/// The filter comes from `RUST_LOG` and falls back to `info`. Output always
/// goes to stderr because stdout carries the report and the fork protocol.
/// Calling this more than once is a no-op.
pub fn init_logging() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init();
    });
}
