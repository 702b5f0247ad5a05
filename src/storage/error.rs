//! Store error types.

use thiserror::Error;

/// Errors that can occur while reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store directory could not be created.
    #[error("failed to create store directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be read.
    #[error("failed to read '{key}': {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be written.
    #[error("failed to write '{key}': {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// The key contains characters that cannot be used as a file name.
    #[error("invalid store key '{0}'")]
    InvalidKey(String),

    /// The store is unusable (e.g. a poisoned lock).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_contains_key() {
        let err = StoreError::Read {
            key: "timer_stats".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("timer_stats"));
        assert!(err.to_string().contains("denied"));
    }
}
