//! `kiln start`: serve a build directory until Ctrl+C.
//!
//! Lifecycle:
//! - Load and validate configuration
//! - Open the directory engine and the build tracker
//! - Bind the server on the first free port of the range
//! - Scan the directory once, then watch it for changes
//! - Shut down gracefully on Ctrl+C

use crate::cli::StartArgs;
use crate::config::KilnConfig;
use crate::dev::{BuildTracker, DevServer, Render};
use crate::error::{Result, ResultExt};
use crate::ui;
use kiln_engine::{BuildEngine, DirEngine};
use std::sync::Arc;
use tokio::signal;

/// Execute the start command.
///
/// `quiet` comes from the global `--quiet` flag.
///
/// # Errors
///
/// Returns errors for invalid configuration, an unusable root directory or
/// a watcher that cannot be started. A port range with no free port is not
/// an error: it is shown on the status board and the command keeps running.
pub async fn execute(args: StartArgs, quiet: bool) -> Result<()> {
    let config = KilnConfig::load(&args, quiet)?;
    config.validate()?;
    let host = config.host_addr()?;

    let engine = Arc::new(
        DirEngine::new(&config.root).with_hint("Run your build first, or pass the output directory")?,
    );
    let plain = config.quiet || !ui::StatusBoard::should_show();
    if !config.quiet {
        ui::info(&format!("Serving {}", engine.root().display()));
    }

    let renderer: Option<Arc<dyn Render>> = if config.quiet {
        None
    } else {
        Some(Arc::new(ui::StatusBoard::new()))
    };
    let tracker = Arc::new(BuildTracker::new(renderer));

    let server = DevServer::new(
        Arc::clone(&engine) as Arc<dyn BuildEngine>,
        Arc::clone(&tracker),
        host,
        config.ports(),
    );
    let handle = server.start().await?;

    match handle.url() {
        Some(url) if plain && !config.quiet => ui::success(&format!("Listening on {}", url)),
        Some(_) => {}
        None => {
            if let Some(failure) = tracker.error() {
                ui::error(&failure.message);
            }
        }
    }

    let files = engine.scan().await?;
    tracing::debug!("initial scan found {} artifact files", files);

    let watch = engine
        .watch(config.watch_ignore.clone(), config.debounce_ms)
        .context("Failed to watch the artifact directory")?;
    tracing::debug!("watching {}", watch.root().display());

    if plain && !config.quiet {
        ui::info("Press Ctrl+C to stop");
    }
    signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    drop(watch);
    handle.shutdown().await;

    if !config.quiet {
        ui::success("Development server stopped");
    }
    Ok(())
}
