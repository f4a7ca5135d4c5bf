//! Command implementations.
//!
//! - [`start`] - Serve a build output directory

pub mod start;

pub use start::execute as start_execute;
