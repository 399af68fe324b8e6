//! Structured logging with `tracing`.
//!
//! - [`init_subscriber`] installs the process-wide stderr subscriber
//! - [`level_for`] maps the command-line verbosity flags to a filter level
//! - [`capture_logs`] records events in memory for assertions in tests

pub mod test_utils;

pub use test_utils::{CapturedEvent, CapturedLogs, capture_logs};

/// Default minimum log level.
pub const DEFAULT_LEVEL: &str = "info";

/// Minimum level for the given verbosity flags.
///
/// `--diagnostic` wins over `--verbose`.
pub fn level_for(verbose: bool, diagnostic: bool) -> &'static str {
    if diagnostic {
        "trace"
    } else if verbose {
        "debug"
    } else {
        DEFAULT_LEVEL
    }
}

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_subscriber(level: &str) {
    use std::io::IsTerminal;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact();

    let _ = subscriber.try_init();
}
