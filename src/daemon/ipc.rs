//! IPC Server for the study timer.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for timer commands
//! - Dispatch to the [`TimerEngine`](super::timer::TimerEngine) through a [`TimerHandle`]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use crate::types::{Activity, IpcRequest, IpcResponse, SettingsPatch, TimerMode};

use super::runtime::TimerHandle;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {MAX_REQUEST_SIZE} bytes)")]
    RequestTooLarge,

    /// Empty request
    #[error("Connection closed by client")]
    EmptyRequest,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket cannot be bound.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be accepted.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Receives and deserializes an IPC request from the stream.
    ///
    /// Reads until the client closes its write side, with a read timeout
    /// and a size limit.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or deserialization fails.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::with_capacity(MAX_REQUEST_SIZE);
        let limit = (MAX_REQUEST_SIZE + 1) as u64;

        let read_result = timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            (&mut *stream).take(limit).read_to_end(&mut buffer),
        )
        .await;

        let n = match read_result {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        };

        if n == 0 {
            return Err(IpcError::EmptyRequest.into());
        }
        if n > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).with_context(|| "Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Accepts connections forever, serving each on its own task.
    ///
    /// # Errors
    ///
    /// Returns an error if accepting a connection fails.
    pub async fn serve(&self, handler: RequestHandler) -> Result<()> {
        loop {
            let mut stream = self.accept().await?;
            let handler = handler.clone();
            tokio::spawn(async move {
                if let Err(e) = handler.handle_connection(&mut stream).await {
                    warn!("IPC connection failed: {:#}", e);
                }
            });
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the timer engine.
#[derive(Clone)]
pub struct RequestHandler {
    timer: TimerHandle,
}

impl RequestHandler {
    /// Creates a new request handler for the given timer.
    pub fn new(timer: TimerHandle) -> Self {
        Self { timer }
    }

    /// Reads one request from `stream`, handles it and writes the response.
    ///
    /// Malformed requests are answered with an error response.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be written.
    pub async fn handle_connection(&self, stream: &mut UnixStream) -> Result<()> {
        let response = match IpcServer::receive_request(stream).await {
            Ok(request) => {
                debug!("IPC request: {:?}", request);
                self.handle(request).await
            }
            Err(e) => IpcResponse::error(format!("Invalid request: {:#}", e)),
        };
        IpcServer::send_response(stream, &response).await
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        match request {
            IpcRequest::Start => self.handle_start().await,
            IpcRequest::Pause => self.handle_pause().await,
            IpcRequest::Stop => self.handle_stop().await,
            IpcRequest::Reset => self.handle_reset().await,
            IpcRequest::Mode { mode } => self.handle_mode(mode).await,
            IpcRequest::Task { label } => self.handle_task(label).await,
            IpcRequest::ClearTasks => self.handle_clear_tasks().await,
            IpcRequest::Settings { patch } => self.handle_settings(patch).await,
            IpcRequest::Status => self.handle_status().await,
        }
    }

    /// Handles the start command.
    async fn handle_start(&self) -> IpcResponse {
        let (before, snapshot) = self
            .timer
            .with_engine(|engine| {
                let before = engine.activity();
                engine.start();
                (before, engine.snapshot())
            })
            .await;

        let message = match before {
            Activity::Running => "Timer is already running",
            Activity::Paused => "Timer resumed",
            Activity::Idle => "Timer started",
        };
        IpcResponse::success(message, Some(snapshot))
    }

    /// Handles the pause command (toggles pause/resume).
    ///
    /// While idle the only effect is cancelling a pending auto-start.
    async fn handle_pause(&self) -> IpcResponse {
        let (before, had_auto_start, snapshot) = self
            .timer
            .with_engine(|engine| {
                let before = engine.activity();
                let had_auto_start = engine.pending_auto_start().is_some();
                engine.pause();
                (before, had_auto_start, engine.snapshot())
            })
            .await;

        match before {
            Activity::Running => IpcResponse::success("Timer paused", Some(snapshot)),
            Activity::Paused => IpcResponse::success("Timer resumed", Some(snapshot)),
            Activity::Idle if had_auto_start => {
                IpcResponse::success("Auto-start cancelled", Some(snapshot))
            }
            Activity::Idle => IpcResponse::error("Timer is not running"),
        }
    }

    /// Handles the stop command.
    async fn handle_stop(&self) -> IpcResponse {
        let snapshot = self
            .timer
            .with_engine(|engine| {
                engine.stop();
                engine.snapshot()
            })
            .await;
        IpcResponse::success("Timer stopped", Some(snapshot))
    }

    /// Handles the reset command.
    async fn handle_reset(&self) -> IpcResponse {
        let snapshot = self
            .timer
            .with_engine(|engine| {
                engine.reset();
                engine.snapshot()
            })
            .await;
        IpcResponse::success("Timer reset", Some(snapshot))
    }

    /// Handles the mode command.
    async fn handle_mode(&self, mode: TimerMode) -> IpcResponse {
        let snapshot = self
            .timer
            .with_engine(|engine| {
                engine.switch_mode(mode);
                engine.snapshot()
            })
            .await;
        IpcResponse::success(format!("Switched to {}", mode.label()), Some(snapshot))
    }

    /// Handles the task command.
    async fn handle_task(&self, label: Option<String>) -> IpcResponse {
        let snapshot = self
            .timer
            .with_engine(|engine| {
                engine.set_current_task(label.as_deref());
                engine.snapshot()
            })
            .await;

        let message = match &snapshot.current_task {
            Some(task) => format!("Working on \"{}\"", task),
            None => "Current task cleared".to_string(),
        };
        IpcResponse::success(message, Some(snapshot))
    }

    /// Handles the clear-tasks command.
    async fn handle_clear_tasks(&self) -> IpcResponse {
        let snapshot = self
            .timer
            .with_engine(|engine| {
                engine.clear_completed_tasks();
                engine.snapshot()
            })
            .await;
        IpcResponse::success("Completed tasks cleared", Some(snapshot))
    }

    /// Handles the settings command. An empty patch only reads the settings.
    async fn handle_settings(&self, patch: SettingsPatch) -> IpcResponse {
        if patch.is_empty() {
            return self.handle_status().await;
        }

        let (rejected, snapshot) = self
            .timer
            .with_engine(|engine| {
                let rejected = engine.update_settings(&patch);
                (rejected, engine.snapshot())
            })
            .await;

        let message = if rejected.is_empty() {
            "Settings updated".to_string()
        } else {
            format!("Settings updated, ignored: {}", rejected.join("; "))
        };
        IpcResponse::success(message, Some(snapshot))
    }

    /// Handles the status command.
    async fn handle_status(&self) -> IpcResponse {
        let snapshot = self.timer.with_engine(|engine| engine.snapshot()).await;
        IpcResponse::success("", Some(snapshot))
    }
}

// ============================================================================
// Tests
// ============================================================================
