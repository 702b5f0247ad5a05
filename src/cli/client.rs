//! IPC Client for communicating with the study timer daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::types::{IpcRequest, IpcResponse, SettingsPatch, TimerMode};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (64KB)
const MAX_RESPONSE_SIZE: u64 = 65536;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client for the daemon listening on `socket_path`.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Sends a start command to the daemon.
    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    /// Sends a pause (toggle) command to the daemon.
    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    /// Sends a stop command to the daemon.
    pub async fn stop(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Stop).await
    }

    /// Sends a reset command to the daemon.
    pub async fn reset(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Reset).await
    }

    /// Switches the daemon's timer to `mode`.
    pub async fn switch_mode(&self, mode: TimerMode) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Mode { mode })
            .await
    }

    /// Sets the current task label, or clears it with `None`.
    pub async fn set_task(&self, label: Option<String>) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Task { label })
            .await
    }

    /// Clears the completed-task history.
    pub async fn clear_tasks(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::ClearTasks).await
    }

    /// Sends a settings patch. An empty patch reads the current settings.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Settings { patch })
            .await
    }

    /// Sends a status query to the daemon.
    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    /// Sends a request to the daemon with retry logic.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut attempt = 1;
        loop {
            match self.send_request(request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < MAX_RETRIES && e.is::<DaemonUnavailable>() => {
                    tracing::warn!("Request failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Sends a single request to the daemon.
    async fn send_request(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = match timeout(self.timeout, UnixStream::connect(&self.socket_path)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(DaemonUnavailable(e.to_string()).into()),
            Err(_) => return Err(DaemonUnavailable("connection timed out".to_string()).into()),
        };

        let request_json =
            serde_json::to_string(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(request_json.as_bytes()),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to shut down write side")?;

        let mut buffer = Vec::new();
        let n = timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            (&mut stream)
                .take(MAX_RESPONSE_SIZE)
                .read_to_end(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if n == 0 {
            anyhow::bail!("No response from daemon");
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("Failed to parse response")?;

        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }

        Ok(response)
    }
}

/// The daemon socket could not be reached.
#[derive(Debug, thiserror::Error)]
#[error("Cannot connect to the daemon ({0}). Start it with 'studyhive daemon'")]
struct DaemonUnavailable(String);

// ============================================================================
// Tests
// ============================================================================
