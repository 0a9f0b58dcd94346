//! Tracing setup for the CLI.
//!
//! Logs go to stderr so stdout stays clean for the rendered payload.
//! Level defaults to warn; RUST_LOG overrides as usual.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
