//! Live build state for the development server.
//!
//! Bridges the build engine's event stream into one status record per
//! artifact. Records are replaced wholesale on every change event; the
//! gzip size is computed afterwards on the blocking pool and patched into
//! the record that triggered it.

use crate::dev::encoder::gzip_size;
use axum::body::Bytes;
use indexmap::IndexMap;
use kiln_engine::{ArtifactKind, EngineEvent};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Timestamp shown before an artifact's first build.
pub const PENDING_TIMESTAMP: &str = "        ";

/// Build status of a single artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactStatus {
    Pending,
    Done,
}

impl ArtifactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Pending => "pending",
            ArtifactStatus::Done => "done",
        }
    }
}

/// Status record for one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub name: String,
    /// 0 before the first build, 100 once built.
    pub progress: u8,
    /// `HH:MM:SS` of the last update.
    pub timestamp: String,
    /// Gzipped size in bytes, 0 until computed.
    pub size: u64,
    pub status: ArtifactStatus,
    pub done: bool,
    generation: u64,
}

impl FileStatus {
    /// Record for an artifact that has not been built yet.
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            progress: 0,
            timestamp: PENDING_TIMESTAMP.to_string(),
            size: 0,
            status: ArtifactStatus::Pending,
            done: false,
            generation: 0,
        }
    }

    fn built(name: impl Into<String>, generation: u64) -> Self {
        Self {
            name: name.into(),
            progress: 100,
            timestamp: current_time(),
            size: 0,
            status: ArtifactStatus::Done,
            done: true,
            generation,
        }
    }

    /// Identity of this record; bumps every time the record is replaced.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Last build failure reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    pub message: String,
    pub stack: String,
}

impl BuildFailure {
    pub fn new(message: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: stack.into(),
        }
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.message, self.stack)
    }
}

/// Process-wide view of the build: per-artifact records, last error, port.
#[derive(Debug, Clone, Default)]
pub struct AggregateState {
    pub files: IndexMap<String, FileStatus>,
    /// Sum of the known artifact sizes.
    pub size: u64,
    pub error: Option<BuildFailure>,
    pub port: Option<u16>,
}

impl AggregateState {
    fn recompute_size(&mut self) {
        self.size = self.files.values().map(|record| record.size).sum();
    }
}

/// Receives the state after every change worth showing.
pub trait Render: Send + Sync {
    fn render(&self, state: &AggregateState);
}

/// Tracks artifact status from build-engine events.
///
/// With no renderer attached the tracker runs quiet.
pub struct BuildTracker {
    state: RwLock<AggregateState>,
    renderer: Option<Arc<dyn Render>>,
    generations: AtomicU64,
}

/// Shared tracker handle.
pub type SharedTracker = Arc<BuildTracker>;

impl BuildTracker {
    /// Create a tracker with a pending record for every artifact kind.
    pub fn new(renderer: Option<Arc<dyn Render>>) -> Self {
        let files = ArtifactKind::ALL
            .iter()
            .map(|kind| (kind.as_str().to_string(), FileStatus::pending(kind.as_str())))
            .collect();

        Self {
            state: RwLock::new(AggregateState {
                files,
                ..AggregateState::default()
            }),
            renderer,
            generations: AtomicU64::new(1),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> AggregateState {
        self.state.read().clone()
    }

    /// Current record for an artifact.
    pub fn file(&self, name: &str) -> Option<FileStatus> {
        self.state.read().files.get(name).cloned()
    }

    pub fn error(&self) -> Option<BuildFailure> {
        self.state.read().error.clone()
    }

    pub fn port(&self) -> Option<u16> {
        self.state.read().port
    }

    /// Record the port the server is listening on.
    pub fn set_port(&self, port: u16) {
        self.state.write().port = Some(port);
        self.render();
    }

    /// Record a build or startup failure. Artifact records are left alone.
    pub fn record_error(&self, failure: BuildFailure) {
        tracing::error!("{}", failure.message);
        self.state.write().error = Some(failure);
        self.render();
    }

    /// Apply one engine event.
    ///
    /// Returns the handle of the size computation when one was started.
    pub fn handle_event(self: &Arc<Self>, event: EngineEvent) -> Option<JoinHandle<()>> {
        match event {
            EngineEvent::Error { message, stack } => {
                self.record_error(BuildFailure::new(message, stack));
                None
            }
            EngineEvent::Change {
                artifact,
                variant,
                tree,
            } => {
                let buffer = match tree.get(&artifact).and_then(|variants| variants.get(&variant)) {
                    Some(node) => node.buffer.clone(),
                    None => {
                        tracing::warn!("change event for {}/{} has no node", artifact, variant);
                        Bytes::new()
                    }
                };
                self.install(artifact, buffer)
            }
        }
    }

    /// Consume engine events until the engine goes away.
    pub async fn run(self: Arc<Self>, mut events: broadcast::Receiver<EngineEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("status display skipped {} build events", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }

    fn install(self: &Arc<Self>, name: String, buffer: Bytes) -> Option<JoinHandle<()>> {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("{} built ({} bytes)", name, buffer.len());

        {
            let mut state = self.state.write();
            state
                .files
                .insert(name.clone(), FileStatus::built(name.as_str(), generation));
            state.recompute_size();
        }
        self.render();

        // Gzipping nothing still yields a ~20 byte header, keep empty artifacts at 0.
        if buffer.is_empty() {
            return None;
        }

        let tracker = Arc::clone(self);
        Some(tokio::spawn(async move {
            let raw_len = buffer.len() as u64;
            let size = match tokio::task::spawn_blocking(move || gzip_size(&buffer)).await {
                Ok(Ok(size)) => size,
                Ok(Err(e)) => {
                    tracing::debug!("gzip size of {} failed: {}", name, e);
                    raw_len
                }
                Err(e) => {
                    tracing::debug!("gzip size task for {} failed: {}", name, e);
                    raw_len
                }
            };
            if tracker.apply_size(&name, generation, size) {
                tracker.render();
            }
        }))
    }

    /// Store `size` on the record if it is still the one from `generation`.
    fn apply_size(&self, name: &str, generation: u64, size: u64) -> bool {
        let mut state = self.state.write();
        match state.files.get_mut(name) {
            Some(record) if record.generation == generation => {
                record.size = size;
            }
            _ => {
                tracing::warn!("dropping stale size for {}", name);
                return false;
            }
        }
        state.recompute_size();
        true
    }

    fn render(&self) {
        if let Some(renderer) = &self.renderer {
            renderer.render(&self.state.read());
        }
    }
}

fn current_time() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_engine::{single_node_tree, Node};
    use std::sync::atomic::AtomicUsize;

    fn change(artifact: &str, variant: &str, buffer: &'static [u8]) -> EngineEvent {
        EngineEvent::Change {
            artifact: artifact.to_string(),
            variant: variant.to_string(),
            tree: Arc::new(single_node_tree(artifact, variant, Node::new(buffer))),
        }
    }

    #[derive(Default)]
    struct CountingRenderer {
        calls: AtomicUsize,
    }

    impl Render for CountingRenderer {
        fn render(&self, _state: &AggregateState) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_new_tracker_has_pending_records() {
        let tracker = BuildTracker::new(None);
        let state = tracker.snapshot();

        let names: Vec<&str> = state.files.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec!["assets", "document", "script", "manifest", "style", "service-worker"]
        );
        for record in state.files.values() {
            assert_eq!(record.progress, 0);
            assert_eq!(record.timestamp, PENDING_TIMESTAMP);
            assert_eq!(record.size, 0);
            assert_eq!(record.status, ArtifactStatus::Pending);
            assert!(!record.done);
        }
        assert!(state.error.is_none());
        assert!(state.port.is_none());
    }

    #[tokio::test]
    async fn test_change_event_marks_done_and_sizes() {
        let tracker = Arc::new(BuildTracker::new(None));
        let buffer: &'static [u8] = b"console.log('hello world'); console.log('hello world');";

        let handle = tracker.handle_event(change("script", "bundle", buffer));

        let record = tracker.file("script").unwrap();
        assert_eq!(record.status, ArtifactStatus::Done);
        assert!(record.done);
        assert_eq!(record.progress, 100);
        assert_eq!(record.timestamp.len(), 8);
        assert_eq!(record.timestamp.as_bytes()[2], b':');
        assert_eq!(record.timestamp.as_bytes()[5], b':');

        handle.expect("size computation should start").await.unwrap();

        let record = tracker.file("script").unwrap();
        assert_eq!(record.size, gzip_size(buffer).unwrap());
        assert!(record.size > 0);
        assert_eq!(tracker.snapshot().size, record.size);
    }

    #[tokio::test]
    async fn test_empty_buffer_skips_size() {
        let tracker = Arc::new(BuildTracker::new(None));

        let handle = tracker.handle_event(change("style", "bundle.css", b""));

        assert!(handle.is_none());
        let record = tracker.file("style").unwrap();
        assert!(record.done);
        assert_eq!(record.size, 0);
    }

    #[tokio::test]
    async fn test_empty_rebuild_clears_total_size() {
        let tracker = Arc::new(BuildTracker::new(None));

        let handle = tracker.handle_event(change("script", "bundle", b"console.log('sized');"));
        handle.unwrap().await.unwrap();
        assert!(tracker.snapshot().size > 0);

        assert!(tracker.handle_event(change("script", "bundle", b"")).is_none());

        let state = tracker.snapshot();
        assert_eq!(state.files["script"].size, 0);
        assert_eq!(state.size, 0);
        assert_eq!(state.size, state.files.values().map(|f| f.size).sum::<u64>());
    }

    #[tokio::test]
    async fn test_missing_tree_node_installs_done_record() {
        let tracker = Arc::new(BuildTracker::new(None));
        let event = EngineEvent::Change {
            artifact: "manifest".to_string(),
            variant: "manifest.json".to_string(),
            tree: Arc::new(single_node_tree("manifest", "other", Node::new("{}"))),
        };

        assert!(tracker.handle_event(event).is_none());
        let record = tracker.file("manifest").unwrap();
        assert!(record.done);
        assert_eq!(record.size, 0);
    }

    #[tokio::test]
    async fn test_second_change_replaces_record() {
        let tracker = Arc::new(BuildTracker::new(None));

        let first = tracker.handle_event(change("script", "bundle", b"aaaaaaaaaaaaaaaaaaaaaaaa"));
        let first_generation = tracker.file("script").unwrap().generation();

        let second = tracker.handle_event(change("script", "bundle", b"let x = 1; let y = 2;"));
        let current = tracker.file("script").unwrap();
        assert_ne!(current.generation(), first_generation);

        second.unwrap().await.unwrap();
        first.unwrap().await.unwrap();

        let record = tracker.file("script").unwrap();
        assert_eq!(record.size, gzip_size(b"let x = 1; let y = 2;").unwrap());
        assert_eq!(record.timestamp, current.timestamp);
        assert_eq!(record.progress, 100);
        assert_eq!(record.status, ArtifactStatus::Done);
    }

    #[tokio::test]
    async fn test_stale_size_is_dropped() {
        let tracker = Arc::new(BuildTracker::new(None));

        tracker.handle_event(change("style", "bundle.css", b""));
        let stale = tracker.file("style").unwrap().generation();
        tracker.handle_event(change("style", "bundle.css", b""));
        let current = tracker.file("style").unwrap();

        assert!(!tracker.apply_size("style", stale, 999));
        assert_eq!(tracker.file("style").unwrap(), current);

        assert!(tracker.apply_size("style", current.generation(), 42));
        assert_eq!(tracker.file("style").unwrap().size, 42);
    }

    #[test]
    fn test_error_event_keeps_records() {
        let tracker = Arc::new(BuildTracker::new(None));
        let before = tracker.snapshot().files;

        tracker.handle_event(EngineEvent::Error {
            message: "Unexpected token".to_string(),
            stack: "\n    at index.js:1:1".to_string(),
        });

        let error = tracker.error().unwrap();
        assert_eq!(error.to_string(), "Unexpected token\n    at index.js:1:1");
        assert_eq!(tracker.snapshot().files, before);
    }

    #[tokio::test]
    async fn test_renders_on_install_and_size() {
        let renderer = Arc::new(CountingRenderer::default());
        let shared: Arc<dyn Render> = renderer.clone();
        let tracker = Arc::new(BuildTracker::new(Some(shared)));

        let handle = tracker.handle_event(change("document", "index.html", b"<html></html>"));
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 1);

        handle.unwrap().await.unwrap();
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 2);

        tracker.set_port(8080);
        assert_eq!(renderer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.port(), Some(8080));
    }

    #[tokio::test]
    async fn test_run_consumes_until_closed() {
        let tracker = Arc::new(BuildTracker::new(None));
        let (tx, rx) = broadcast::channel(16);

        tx.send(change("style", "bundle.css", b"")).unwrap();
        tx.send(EngineEvent::Error {
            message: "boom".to_string(),
            stack: String::new(),
        })
        .unwrap();
        drop(tx);

        Arc::clone(&tracker).run(rx).await;

        assert!(tracker.file("style").unwrap().done);
        assert_eq!(tracker.error().unwrap().message, "boom");
    }
}
