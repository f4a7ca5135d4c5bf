//! Error handling for the kiln CLI.
//!
//! `CliError` is the top-level error returned by commands. Domain errors
//! (`ConfigError`, engine errors) convert into it automatically, and
//! `ResultExt` attaches hints or context on the way up.
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_config(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path)
//!         .context(path.display())
//!         .with_hint("Create kiln.config.json or pass --config <file>")
//! }
//! ```

mod miette;

pub use self::miette::cli_error_to_miette;

use kiln_engine::EngineError;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The build engine could not be created or observed
    #[error("Build engine error: {0}")]
    Engine(#[from] EngineError),

    /// I/O errors from file system or socket operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Development server errors
    #[error("Server error: {0}")]
    Server(String),

    /// A route pattern failed to compile
    #[error("Invalid route pattern: {0}")]
    Route(#[from] regex::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the given location
    #[error("Config file not found: {}\n\nHint: Create a kiln.config.json file or check the --config path", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },

    /// I/O error while reading config
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message with `msg`.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("kiln.config.json"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("kiln.config.json"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "portStart".to_string(),
            value: "9001".to_string(),
            hint: "portStart must not exceed portEnd".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'portStart'"));
        assert!(msg.contains("9001"));
        assert!(msg.contains("must not exceed"));
    }

    #[test]
    fn test_cli_error_from_engine_error() {
        let cli_err: CliError = EngineError::NotFound("dist".to_string()).into();
        assert!(matches!(cli_err, CliError::Engine(_)));
        assert_eq!(cli_err.to_string(), "Build engine error: dist not found");
    }

    #[test]
    fn test_cli_error_from_regex_error() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let cli_err: CliError = regex_err.into();
        assert!(matches!(cli_err, CliError::Route(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("test.json")));

        let err = result.with_hint("Try creating the file").unwrap_err();
        assert!(err.to_string().contains("Hint: Try creating the file"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("test.json")));

        let err = result.context("Failed to start").unwrap_err();
        assert!(err.to_string().starts_with("Failed to start: "));
    }
}
