//! Build engine backed by an output directory on disk.
//!
//! Serves whatever another tool wrote into the directory: every fetch reads
//! the file fresh, and a watcher turns file writes into change events so the
//! status display follows the external build.

mod resolve;
mod watcher;

pub use resolve::{asset_content_type, classify, document_candidates, safe_join};
pub use watcher::{FileChange, FileWatcher};

use crate::artifact::single_node_tree;
use crate::error::{EngineError, EngineResult};
use crate::{ArtifactKind, BuildEngine, EngineEvent, Node};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const EVENT_CAPACITY: usize = 256;

/// Engine serving artifacts from a directory.
#[derive(Debug, Clone)]
pub struct DirEngine {
    root: PathBuf,
    events: broadcast::Sender<EngineEvent>,
}

impl DirEngine {
    /// Create an engine rooted at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] if `root` is not an existing directory.
    pub fn new(root: impl AsRef<Path>) -> EngineResult<Self> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(EngineError::NotFound(root.display().to_string()));
        }
        let root = root
            .canonicalize()
            .map_err(|e| EngineError::io(root, e))?;
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(Self { root, events })
    }

    /// Directory the engine serves from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Push an event to every subscriber. Dropped when nobody listens.
    pub fn emit(&self, event: EngineEvent) {
        let _ = self.events.send(event);
    }

    async fn read(&self, rel: &str) -> EngineResult<Node> {
        let path = safe_join(&self.root, rel)?;
        let buffer = tokio::fs::read(&path)
            .await
            .map_err(|e| EngineError::io(&path, e))?;
        Ok(Node::new(buffer))
    }

    /// Emit one change event per servable file currently in the directory.
    ///
    /// Returns the number of change events emitted.
    pub async fn scan(&self) -> EngineResult<usize> {
        let mut pending = vec![self.root.clone()];
        let mut emitted = 0;

        while let Some(dir) = pending.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|e| EngineError::io(&dir, e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| EngineError::io(&dir, e))?
            {
                let path = entry.path();
                let hidden = entry.file_name().to_string_lossy().starts_with('.');
                if hidden {
                    continue;
                }
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| EngineError::io(&path, e))?;
                let is_dir = if file_type.is_symlink() {
                    tokio::fs::metadata(&path)
                        .await
                        .is_ok_and(|meta| meta.is_dir())
                } else {
                    file_type.is_dir()
                };
                if is_dir {
                    pending.push(path);
                } else if self.reload(&path).await {
                    emitted += 1;
                }
            }
        }

        tracing::debug!("scanned {} artifacts in {}", emitted, self.root.display());
        Ok(emitted)
    }

    /// Re-read one file and emit the matching event.
    ///
    /// Returns `true` if a change event was emitted. Read failures are
    /// reported as error events.
    pub async fn reload(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        let Some((kind, variant)) = classify(rel) else {
            return false;
        };

        match tokio::fs::read(path).await {
            Ok(buffer) => {
                let mut node = Node::new(buffer);
                if kind == ArtifactKind::Assets {
                    node = node.with_content_type(asset_content_type(path));
                }
                let artifact = kind.as_str();
                tracing::debug!("{} changed ({})", artifact, variant);
                self.emit(EngineEvent::Change {
                    artifact: artifact.to_string(),
                    variant: variant.clone(),
                    tree: Arc::new(single_node_tree(artifact, &variant, node)),
                });
                true
            }
            Err(e) => {
                self.emit(EngineEvent::from_error(&EngineError::io(path, e)));
                false
            }
        }
    }

    /// Watch the directory and emit events for every relevant file write.
    ///
    /// The returned handle stops watching when dropped.
    pub fn watch(&self, ignore: Vec<String>, debounce_ms: u64) -> EngineResult<DirWatch> {
        let (watcher, mut changes) = FileWatcher::new(self.root.clone(), ignore, debounce_ms)?;
        let engine = self.clone();

        let task = tokio::spawn(async move {
            while let Some(change) = changes.recv().await {
                match change {
                    FileChange::Created(path) | FileChange::Modified(path) => {
                        if path.is_file() {
                            engine.reload(&path).await;
                        }
                    }
                    FileChange::Removed(path) => {
                        tracing::debug!("removed {}", path.display());
                    }
                }
            }
        });

        Ok(DirWatch {
            watcher,
            task,
        })
    }
}

/// Running watch over a [`DirEngine`] root.
pub struct DirWatch {
    watcher: FileWatcher,
    task: JoinHandle<()>,
}

impl DirWatch {
    pub fn root(&self) -> &Path {
        self.watcher.root()
    }
}

impl Drop for DirWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[async_trait]
impl BuildEngine for DirEngine {
    async fn manifest(&self) -> EngineResult<Node> {
        self.read("manifest.json").await
    }

    async fn service_worker(&self) -> EngineResult<Node> {
        match self.read("service-worker.js").await {
            Err(EngineError::NotFound(_)) => self.read("sw.js").await,
            other => other,
        }
    }

    async fn script(&self, name: &str) -> EngineResult<Node> {
        self.read(&format!("{}.js", name)).await
    }

    async fn style(&self) -> EngineResult<Node> {
        self.read("bundle.css").await
    }

    async fn asset(&self, name: &str) -> EngineResult<Node> {
        let path = safe_join(&self.root, name)?;
        let node = self.read(name).await?;
        Ok(node.with_content_type(asset_content_type(&path)))
    }

    async fn document(&self, url: &str) -> EngineResult<Node> {
        for candidate in document_candidates(url) {
            match self.read(&candidate).await {
                Err(EngineError::NotFound(_)) => continue,
                other => return other,
            }
        }
        Err(EngineError::NotFound(format!("document for {}", url)))
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}
