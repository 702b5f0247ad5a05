//! Completion sounds for the study timer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐
//! │   SoundPlayer    │ ← trait used by the timer
//! └────────┬─────────┘
//!          │
//!          ├──▶ RodioSoundPlayer   (feature "audio": synthesized sine tone)
//!          ├──▶ BellSoundPlayer    (terminal bell fallback)
//!          └──▶ MockSoundPlayer    (tests)
//! ```
//!
//! Playback is non-blocking and best effort: failures are logged by the
//! timer and never interrupt it.

mod bell;
mod error;
#[cfg(feature = "audio")]
mod player;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub use bell::BellSoundPlayer;
pub use error::SoundError;
#[cfg(feature = "audio")]
pub use player::RodioSoundPlayer;

/// Trait for tone playback implementations.
pub trait SoundPlayer: Send + Sync {
    /// Plays a short tone without blocking the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if playback could not be started.
    fn play_tone(&self) -> Result<(), SoundError>;
}

/// Returns the best available player for this build.
#[must_use]
pub fn default_player() -> Arc<dyn SoundPlayer> {
    #[cfg(feature = "audio")]
    {
        Arc::new(RodioSoundPlayer::default())
    }
    #[cfg(not(feature = "audio"))]
    {
        Arc::new(BellSoundPlayer)
    }
}

/// Mock sound player for testing.
#[derive(Debug, Default)]
pub struct MockSoundPlayer {
    play_count: AtomicUsize,
    should_fail: AtomicBool,
}

impl MockSoundPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_fail(&self, should_fail: bool) {
        self.should_fail.store(should_fail, Ordering::SeqCst);
    }

    #[must_use]
    pub fn play_count(&self) -> usize {
        self.play_count.load(Ordering::SeqCst)
    }
}

impl SoundPlayer for MockSoundPlayer {
    fn play_tone(&self) -> Result<(), SoundError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SoundError::PlaybackError("Mock failure".to_string()));
        }
        self.play_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
