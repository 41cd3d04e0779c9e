//! Logging initialization from the `DRIFT_LOG` environment variable.
//!
//! `DRIFT_LOG` uses tracing's directive grammar (`module=level,...`).
//! Absent or empty, the engine logs warnings and errors only.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber. Safe to call more than once;
/// subsequent calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_env("DRIFT_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
