//! File system watcher with debouncing for the output directory.
//!
//! Watches the whole root recursively and filters changes down to files
//! the engine serves, ignoring hidden files and configured patterns.

use crate::error::{EngineError, EngineResult};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// File was modified
    Modified(PathBuf),
    /// File was created
    Created(PathBuf),
    /// File was removed
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }
}

/// File watcher with debouncing and filtering.
///
/// Sends change events through a channel. Debouncing drops repeat events
/// for the same path inside the window so one save produces one rebuild.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root` recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if the root does not exist or the platform watcher
    /// cannot be attached.
    pub fn new(
        root: PathBuf,
        ignore_patterns: Vec<String>,
        debounce_ms: u64,
    ) -> EngineResult<(Self, mpsc::Receiver<FileChange>)> {
        if !root.exists() {
            return Err(EngineError::NotFound(root.display().to_string()));
        }

        let (tx, rx) = mpsc::channel(100);

        let debounce = Duration::from_millis(debounce_ms);
        let mut last_event: Option<(PathBuf, Instant)> = None;
        let watch_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!("file watcher error: {}", err);
                    return;
                }
            };

            for path in &event.paths {
                if should_ignore(path, &watch_root, &ignore_patterns) {
                    continue;
                }

                let now = Instant::now();
                if let Some((last_path, last_time)) = &last_event {
                    if last_path == path && now.duration_since(*last_time) < debounce {
                        continue;
                    }
                }
                last_event = Some((path.clone(), now));

                let change = match event.kind {
                    notify::EventKind::Create(_) => FileChange::Created(path.clone()),
                    notify::EventKind::Modify(_) => FileChange::Modified(path.clone()),
                    notify::EventKind::Remove(_) => FileChange::Removed(path.clone()),
                    _ => continue,
                };

                // Receiver gone means the engine stopped watching.
                if tx.blocking_send(change).is_err() {
                    return;
                }
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Check if a path should be ignored.
///
/// Paths outside the root, hidden files and directories, and anything
/// matching an ignore pattern are skipped. Patterns starting with `*` match
/// a suffix, all others match a leading path segment.
pub(crate) fn should_ignore(path: &Path, root: &Path, ignore_patterns: &[String]) -> bool {
    let rel_path = match path.strip_prefix(root) {
        Ok(p) => p,
        Err(_) => return true,
    };

    let path_str = rel_path.to_string_lossy();

    for pattern in ignore_patterns {
        if let Some(suffix) = pattern.strip_prefix('*') {
            if path_str.ends_with(suffix) {
                return true;
            }
        } else if path_str.starts_with(pattern.as_str())
            || path_str.contains(&format!("/{}", pattern))
        {
            return true;
        }
    }

    rel_path.components().any(|component| {
        component
            .as_os_str()
            .to_str()
            .is_some_and(|name| name.starts_with('.') && name != "." && name != "..")
    })
}
