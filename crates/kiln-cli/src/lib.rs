//! kiln - development server for pre-built web artifacts.
//!
//! Serves the output of a build engine over HTTP and keeps a live view of
//! every artifact's build status.
//!
//! # Architecture
//!
//! - [`dev`] - Routing, content encoding, status tracking, server bootstrap
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal output and the live status board
//! - `cli`, `config`, `commands` - The `kiln` binary's front end
//!
//! # Example
//!
//! ```rust,no_run
//! use kiln_cli::dev::{BuildTracker, DevServer};
//! use kiln_engine::DirEngine;
//! use std::sync::Arc;
//!
//! # async fn run() -> kiln_cli::Result<()> {
//! let engine = Arc::new(DirEngine::new("dist")?);
//! let tracker = Arc::new(BuildTracker::new(None));
//! let handle = DevServer::new(engine, tracker, [127, 0, 0, 1].into(), 8080..=9000)
//!     .start()
//!     .await?;
//! println!("serving on {:?}", handle.url());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod dev;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
