//! Artifact names, buffers, and the tree snapshots carried by change events.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;

/// The fixed set of artifact kinds a build engine produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Assets,
    Document,
    Script,
    Manifest,
    Style,
    ServiceWorker,
}

impl ArtifactKind {
    /// Every kind, in the order status displays list them.
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Assets,
        ArtifactKind::Document,
        ArtifactKind::Script,
        ArtifactKind::Manifest,
        ArtifactKind::Style,
        ArtifactKind::ServiceWorker,
    ];

    /// Name used in change events and status records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Assets => "assets",
            ArtifactKind::Document => "document",
            ArtifactKind::Script => "script",
            ArtifactKind::Manifest => "manifest",
            ArtifactKind::Style => "style",
            ArtifactKind::ServiceWorker => "service-worker",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A built artifact held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    /// Artifact bytes as served to clients.
    pub buffer: Bytes,
    /// MIME type when the engine knows it (assets only).
    pub content_type: Option<String>,
}

impl Node {
    pub fn new(buffer: impl Into<Bytes>) -> Self {
        Self {
            buffer: buffer.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Artifact name -> variant name -> node.
pub type TreeSnapshot = HashMap<String, HashMap<String, Node>>;

/// Build a snapshot holding a single node.
pub fn single_node_tree(artifact: &str, variant: &str, node: Node) -> TreeSnapshot {
    let mut variants = HashMap::new();
    variants.insert(variant.to_string(), node);
    let mut tree = HashMap::new();
    tree.insert(artifact.to_string(), variants);
    tree
}
