//! Errors produced by build engines.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to produce an artifact or to observe the output directory.
///
/// The HTTP layer treats every variant as "not found" and sends the
/// `Display` text as the response body, so messages stay short and
/// free of hints.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested artifact does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The engine could not build the artifact.
    #[error("{0}")]
    Failed(String),

    /// The artifact path escapes the engine root or is otherwise unusable.
    #[error("invalid artifact path: {0}")]
    InvalidPath(String),

    /// Reading the artifact from disk failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file watcher could not be created or attached.
    #[error("file watcher error: {0}")]
    Watch(#[from] notify::Error),
}

impl EngineError {
    /// Wrap an I/O error, mapping `NotFound` onto [`EngineError::NotFound`].
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return EngineError::NotFound(name);
        }
        EngineError::Io { path, source }
    }
}

/// Result alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
