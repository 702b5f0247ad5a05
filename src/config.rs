//! Process configuration: where the daemon keeps its data and socket.
//!
//! Each path is resolved from, in order, the command-line flag, the
//! environment and a platform default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "STUDYHIVE_DATA_DIR";

/// Environment variable overriding the socket path.
pub const SOCKET_ENV: &str = "STUDYHIVE_SOCKET";

const APP_DIR_NAME: &str = "studyhive";
const HOME_DIR_NAME: &str = ".studyhive";
const SOCKET_FILE_NAME: &str = "studyhive.sock";

/// Resolved paths used by the daemon and the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Directory holding settings and statistics
    pub data_dir: PathBuf,
    /// Unix socket the daemon listens on
    pub socket_path: PathBuf,
}

impl AppConfig {
    /// Resolves the configuration from flags, then the environment, then
    /// platform defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if no data directory can be determined.
    pub fn load(data_dir: Option<PathBuf>, socket_path: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir.or_else(|| env_path(DATA_DIR_ENV)) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let socket_path = socket_path.or_else(|| env_path(SOCKET_ENV));
        Ok(Self::with_data_dir(data_dir, socket_path))
    }

    /// Builds a configuration rooted at `data_dir`. The socket defaults to
    /// a file inside it.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>, socket_path: Option<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let socket_path = socket_path.unwrap_or_else(|| data_dir.join(SOCKET_FILE_NAME));
        Self {
            data_dir,
            socket_path,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn default_data_dir() -> Result<PathBuf> {
    if let Some(dir) = dirs::data_local_dir() {
        return Ok(dir.join(APP_DIR_NAME));
    }
    let home = std::env::var_os("HOME").context("HOME is not set and no data directory was found")?;
    Ok(PathBuf::from(home).join(HOME_DIR_NAME))
}
