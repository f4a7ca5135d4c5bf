use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve a build output directory
    ///
    /// Finds a free port, serves manifest, service worker, scripts, styles,
    /// assets and documents from the directory, and rebuilds the status
    /// board whenever a file in it changes. Runs until Ctrl+C.
    Start(StartArgs),
}

/// Arguments for the start command
#[derive(Args, Debug, Default, Clone)]
pub struct StartArgs {
    /// Directory holding the built artifacts
    ///
    /// Defaults to `root` from kiln.config.json, or `dist`.
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// First port to try
    ///
    /// The server takes the first free port from here up to --port-end.
    #[arg(short, long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port: Option<u16>,

    /// Last port to try
    #[arg(long, value_name = "PORT", value_parser = clap::value_parser!(u16).range(1..))]
    pub port_end: Option<u16>,

    /// Address to listen on
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Path to kiln.config.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
