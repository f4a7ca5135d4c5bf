//! Logging setup on top of `tracing`.
//!
//! `--verbose` turns on debug output for the kiln crates, `--quiet` keeps
//! errors only, and otherwise `RUST_LOG` is honoured before falling back to
//! info level.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::logger::init_logger;
//!
//! init_logger(false, false, false);
//! tracing::info!("serving dist/");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "kiln=debug,kiln_cli=debug,kiln_engine=debug,tower_http=debug";
const QUIET_FILTER: &str = "kiln=error,kiln_cli=error,kiln_engine=error";
const DEFAULT_FILTER: &str = "kiln=info,kiln_cli=info,kiln_engine=info";

/// Build the filter for the given verbosity flags.
///
/// `verbose` wins over `quiet`.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Install the global subscriber with an explicit filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    // A subscriber may already be set, e.g. by a test harness.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
