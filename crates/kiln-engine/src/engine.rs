//! The contract between the dev server and whatever produces artifacts.

use crate::error::EngineResult;
use crate::{EngineEvent, Node};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Source of artifact buffers and build events.
///
/// Every fetch is independent of the event stream: the server asks for an
/// artifact per request and never reads buffers out of past change events.
#[async_trait]
pub trait BuildEngine: Send + Sync + std::fmt::Debug {
    /// The web app manifest.
    async fn manifest(&self) -> EngineResult<Node>;

    /// The service worker script.
    async fn service_worker(&self) -> EngineResult<Node>;

    /// A script bundle by name, without the `.js` extension.
    async fn script(&self, name: &str) -> EngineResult<Node>;

    /// The stylesheet bundle.
    async fn style(&self) -> EngineResult<Node>;

    /// A static asset, `name` is relative to the engine root (e.g. `assets/logo.svg`).
    async fn asset(&self, name: &str) -> EngineResult<Node>;

    /// The HTML document for a request URL (path plus optional query).
    async fn document(&self, url: &str) -> EngineResult<Node>;

    /// Register for build events.
    fn subscribe(&self) -> broadcast::Receiver<EngineEvent>;
}
