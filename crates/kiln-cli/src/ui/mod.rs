//! Terminal UI: status messages, formatting, and the live build board.
//!
//! Degrades to plain lines when stderr is not a terminal or when running in CI.
//!
//! # Examples
//!
//! ```no_run
//! use kiln_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Server ready");
//! ui::warning("No manifest.json in dist");
//! ```

mod format;
mod messages;
mod status;

pub use format::{format_size, format_status_line};
pub use messages::{error, info, success, warning};
pub use status::StatusBoard;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var(var).is_ok())
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether a
/// user is attached to stderr.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Apply the color choice globally.
///
/// `no_color` comes from the command line and overrides the environment.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color && should_use_color();
    console::set_colors_enabled(enabled);
    console::set_colors_enabled_stderr(enabled);
}
