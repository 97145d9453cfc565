//! Logging setup
//!
//! Logs go to stderr so stdout carries only the report.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset
pub fn default_filter(verbose: bool, debug: bool) -> &'static str {
    if debug {
        "sigcarve=debug"
    } else if verbose {
        "sigcarve=info"
    } else {
        "warn"
    }
}

/// Installs the global subscriber; `RUST_LOG` takes precedence over the flags
pub fn init_logging(verbose: bool, debug: bool) {
    let env_filter =
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, debug)));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
