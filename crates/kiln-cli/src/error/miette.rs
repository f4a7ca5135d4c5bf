//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use ::miette::Report;

/// Convert a `CliError` into a miette report for the terminal.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => ::miette::miette!("Configuration error: {}", e),
        CliError::Engine(e) => ::miette::miette!(
            help = "Check that the artifact directory exists and is readable",
            "Build engine error: {}",
            e
        ),
        CliError::Server(msg) => ::miette::miette!(
            help = "Another process may hold every port in the range; try --port",
            "Server error: {}",
            msg
        ),
        _ => ::miette::miette!("{}", err),
    }
}
