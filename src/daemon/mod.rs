//! Daemon module for StudyHive.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine with state transitions and countdown logic
//! - `runtime`: Real-time driver for ticks and deferred auto-starts
//! - `ipc`: Unix socket server dispatching commands to the engine

pub mod ipc;
pub mod runtime;
pub mod timer;

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::AppConfig;
use crate::storage::FileStore;

pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use runtime::{TimerHandle, TimerRuntime};
pub use timer::{TimerDeps, TimerEngine, TimerEvent};

/// Runs the daemon until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the data directory or the socket cannot be set up.
pub async fn run(config: &AppConfig) -> Result<()> {
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    run_until(config, shutdown).await
}

/// Runs the daemon until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the data directory or the socket cannot be set up,
/// or if accepting connections fails.
pub async fn run_until(config: &AppConfig, shutdown: impl Future<Output = ()>) -> Result<()> {
    let store = FileStore::open(config.data_dir())
        .with_context(|| format!("Failed to open data directory {:?}", config.data_dir()))?;
    let deps = TimerDeps::system(Arc::new(store));
    serve(config, deps, shutdown).await
}

/// Serves `deps` over the configured socket until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if the socket cannot be bound or accepting fails.
pub async fn serve(
    config: &AppConfig,
    deps: TimerDeps,
    shutdown: impl Future<Output = ()>,
) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let engine = TimerEngine::new(deps, event_tx);
    let runtime = TimerRuntime::new(engine);
    let handler = RequestHandler::new(runtime.handle());

    let server = IpcServer::new(config.socket_path())?;
    info!("StudyHive daemon listening on {:?}", server.socket_path());

    tokio::spawn(runtime::log_events(event_rx));

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let driver = tokio::spawn(runtime.run(async {
        let _ = stop_rx.await;
    }));

    let result = tokio::select! {
        result = server.serve(handler) => result,
        () = shutdown => Ok(()),
    };

    let _ = stop_tx.send(());
    let _ = driver.await;
    info!("StudyHive daemon stopped");
    result
}
