//! Development server module.
//!
//! Serves artifacts from a build engine and tracks the live build state:
//! - Ordered pattern routing from URL to artifact
//! - Content-negotiated (gzip/deflate) delivery
//! - Per-artifact status driven by engine events
//! - Bootstrap on the first free port of a range

pub mod dispatcher;
pub mod encoder;
pub mod port;
pub mod router;
pub mod server;
pub mod state;

// Re-exports
pub use dispatcher::Dispatcher;
pub use encoder::{deliver, gzip_size, negotiate, Encoding};
pub use router::{Params, RouteMatch, Router};
pub use server::{DevServer, ServerHandle};
pub use state::{
    AggregateState, ArtifactStatus, BuildFailure, BuildTracker, FileStatus, Render, SharedTracker,
};
