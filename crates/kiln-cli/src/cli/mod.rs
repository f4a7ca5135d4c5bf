//! Command-line interface definition.
//!
//! - `kiln start [ROOT]` - Serve a build output directory and track its status

mod commands;
mod tests;

use clap::Parser;

pub use commands::{Command, StartArgs};

/// kiln - development server for pre-built web artifacts
#[derive(Parser, Debug)]
#[command(
    name = "kiln",
    version,
    about = "Development server for pre-built web artifacts",
    long_about = "kiln serves a build output directory over HTTP with gzip negotiation,\n\
                  CORS preflight support and a live per-artifact build status board."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    ///
    /// Also hides the live status board.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
