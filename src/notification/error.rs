//! Notification system error types.

use thiserror::Error;

/// Errors that can occur in the notification system.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Failed to send a notification.
    #[error("failed to send notification: {0}")]
    SendFailed(String),
}

impl NotificationError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::SendFailed(_) => {
                "Check that a notification daemon is running, or disable notifications with `studyhive settings --notifications false`"
            }
        }
    }
}
