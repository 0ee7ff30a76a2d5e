//! Tracing setup for the binary.
//!
//! `RUST_LOG` wins when set. Otherwise `-v` flags raise the level of the
//! `dtogen` crates; everything else stays at `warn`.

use tracing_subscriber::EnvFilter;

/// Filter directives for a `-v` count.
pub fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("warn,dtogen={level},dtogen_cli={level}", level = level)
}

/// Install the global subscriber, writing to stderr.
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
