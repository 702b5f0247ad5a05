//! Sound system error types.
//!
//! All sound errors are recoverable: the timer logs them and carries on
//! without audio.

use thiserror::Error;

/// Errors that can occur in the sound playback system.
#[derive(Debug, Error)]
pub enum SoundError {
    /// Audio device is not available (e.g., no speakers connected).
    #[error("audio device not available: {0}")]
    DeviceNotAvailable(String),

    /// Failed to create the audio output stream.
    #[error("failed to create audio stream: {0}")]
    StreamError(String),

    /// Generic sound playback error.
    #[error("sound playback failed: {0}")]
    PlaybackError(String),
}

impl SoundError {
    /// Returns a user-friendly suggestion for resolving this error.
    #[must_use]
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::DeviceNotAvailable(_) => "Connect an audio output device",
            Self::StreamError(_) => "Check your audio settings",
            Self::PlaybackError(_) => "Disable sounds with `studyhive settings --sound false`",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SoundError::DeviceNotAvailable("no device".to_string());
        assert!(err.to_string().contains("no device"));

        let err = SoundError::PlaybackError("stdout closed".to_string());
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn test_suggestion() {
        assert!(SoundError::DeviceNotAvailable("x".into())
            .suggestion()
            .contains("audio output"));
        assert!(SoundError::PlaybackError("x".into())
            .suggestion()
            .contains("--sound false"));
    }
}
