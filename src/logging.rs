//! Structured logging setup
//!
//! Logs go to stderr so stdout carries only command results. The level comes
//! from `ALIASTOOL_LOG` (EnvFilter syntax) when set, otherwise from the
//! verbosity flags.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::LogFormat;

/// Environment variable overriding the log filter
pub const LOG_ENV: &str = "ALIASTOOL_LOG";

/// Default filter directive for a verbosity level
pub fn default_directive(verbose: u8, debug: bool) -> &'static str {
    match (verbose, debug) {
        (_, true) | (2.., _) => "debug",
        (1, _) => "info",
        _ => "warn",
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init(verbose: u8, debug: bool, format: LogFormat) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, debug)));

    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    result.ok();
}
