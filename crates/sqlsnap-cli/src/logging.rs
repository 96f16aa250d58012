use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "SQLSNAP_LOG";

/// Log to stderr, filtered by `SQLSNAP_LOG` (default `warn`).
///
/// Stdout carries the generated statements, so nothing else is written there.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when `run` is called twice (tests).
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
