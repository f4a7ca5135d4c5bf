//! Build engine contract for the kiln development server.
//!
//! A build engine turns sources into in-memory artifacts and pushes progress
//! and error notifications to its subscribers. The server only depends on
//! the [`BuildEngine`] trait; [`DirEngine`] is the implementation shipped with
//! the CLI, serving a directory that some other build tool writes into.
//!
//! # Example
//!
//! ```no_run
//! use kiln_engine::{BuildEngine, DirEngine};
//!
//! # async fn run() -> kiln_engine::EngineResult<()> {
//! let engine = DirEngine::new("dist")?;
//! let mut events = engine.subscribe();
//! engine.scan().await?;
//! let manifest = engine.manifest().await?;
//! println!("{} bytes", manifest.buffer.len());
//! # let _ = events.recv().await;
//! # Ok(())
//! # }
//! ```

mod artifact;
pub mod dir;
mod engine;
mod error;
mod event;

pub use artifact::{single_node_tree, ArtifactKind, Node, TreeSnapshot};
pub use dir::{DirEngine, DirWatch};
pub use engine::BuildEngine;
pub use error::{EngineError, EngineResult};
pub use event::EngineEvent;
