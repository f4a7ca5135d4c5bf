//! Development server bootstrap.
//!
//! Wires the build engine's events into the tracker, builds the request
//! dispatcher, and binds it to the first free port of the configured range.

use crate::dev::dispatcher::Dispatcher;
use crate::dev::port;
use crate::dev::state::{BuildFailure, SharedTracker};
use crate::error::{CliError, Result};
use kiln_engine::BuildEngine;
use std::net::{IpAddr, SocketAddr};
use std::ops::RangeInclusive;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Development server.
pub struct DevServer {
    engine: Arc<dyn BuildEngine>,
    tracker: SharedTracker,
    host: IpAddr,
    ports: RangeInclusive<u16>,
}

impl DevServer {
    /// Create a development server.
    ///
    /// # Arguments
    ///
    /// * `engine` - Build engine producing the served artifacts
    /// * `tracker` - Status tracker fed from the engine's events
    /// * `host` - Address to listen on
    /// * `ports` - Range searched for a free port
    pub fn new(
        engine: Arc<dyn BuildEngine>,
        tracker: SharedTracker,
        host: IpAddr,
        ports: RangeInclusive<u16>,
    ) -> Self {
        Self {
            engine,
            tracker,
            host,
            ports,
        }
    }

    /// Start the development server.
    ///
    /// Subscribes the tracker to engine events before binding, so events
    /// emitted while the port is being found are not lost. When no port is
    /// free the failure is recorded in the tracker and the returned handle
    /// serves nothing; the tracker keeps running.
    ///
    /// # Errors
    ///
    /// Returns an error only if the route table cannot be built.
    pub async fn start(self) -> Result<ServerHandle> {
        let dispatcher = Dispatcher::new(Arc::clone(&self.engine))?;

        let events = self.engine.subscribe();
        let events_task = tokio::spawn(Arc::clone(&self.tracker).run(events));

        let listener = match port::bind_first_available(self.host, self.ports).await {
            Ok(listener) => listener,
            Err(e) => {
                self.tracker.record_error(BuildFailure::new(e.to_string(), ""));
                return Ok(ServerHandle {
                    addr: None,
                    shutdown_tx: None,
                    server_task: None,
                    events_task,
                });
            }
        };

        let addr = listener
            .local_addr()
            .map_err(|e| CliError::Server(format!("bound socket has no address: {}", e)))?;
        self.tracker.set_port(addr.port());
        tracing::info!("listening on http://{}", addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_task = tokio::spawn(async move {
            let result = axum::serve(listener, dispatcher.into_service())
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
            if let Err(e) = result {
                tracing::error!("server error: {}", e);
            }
        });

        Ok(ServerHandle {
            addr: Some(addr),
            shutdown_tx: Some(shutdown_tx),
            server_task: Some(server_task),
            events_task,
        })
    }
}

/// Handle to a running development server.
pub struct ServerHandle {
    addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server_task: Option<JoinHandle<()>>,
    events_task: JoinHandle<()>,
}

impl ServerHandle {
    /// Bound address, `None` if no port could be bound.
    pub fn addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    pub fn port(&self) -> Option<u16> {
        self.addr.map(|addr| addr.port())
    }

    /// Base URL of the server.
    pub fn url(&self) -> Option<String> {
        self.addr.map(|addr| format!("http://{}", addr))
    }

    pub fn is_serving(&self) -> bool {
        self.server_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Stop accepting connections and wait for in-flight requests.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.server_task.take() {
            let _ = task.await;
        }
        self.events_task.abort();
    }
}
