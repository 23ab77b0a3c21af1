//! Tracing subscriber setup for the `dirsort` binary.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Environment variable that overrides the verbosity flags, e.g. `DIRSORT_LOG=debug`.
pub const LOG_ENV_VAR: &str = "DIRSORT_LOG";

/// Maps the number of `-v` flags to a default filter directive.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Installs the global subscriber. Logs go to stderr so they never interleave with
/// the report on stdout; thread names identify the worker behind each line.
///
/// Calling it twice is harmless: the second installation is ignored.
pub fn init_logging(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_names(true)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .try_init();
}
