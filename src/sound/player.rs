//! Tone player using rodio.
//!
//! A short sine tone is synthesized on the fly; no sound files are needed.
//! The output stream is opened on a detached thread per tone because rodio's
//! stream handle cannot be moved across threads.

use std::time::Duration;

use rodio::source::{SineWave, Source};
use rodio::{OutputStream, Sink};
use tracing::{debug, warn};

use super::error::SoundError;
use super::SoundPlayer;

/// Default tone frequency in Hz.
const DEFAULT_FREQUENCY_HZ: f32 = 880.0;

/// Default tone length.
const DEFAULT_DURATION: Duration = Duration::from_millis(400);

/// Tone volume (0.0 - 1.0).
const VOLUME: f32 = 0.2;

/// Plays a synthesized tone through the default audio device.
#[derive(Debug)]
pub struct RodioSoundPlayer {
    frequency_hz: f32,
    duration: Duration,
}

impl Default for RodioSoundPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_FREQUENCY_HZ, DEFAULT_DURATION)
    }
}

impl RodioSoundPlayer {
    /// Creates a player for a tone of `frequency_hz` lasting `duration`.
    #[must_use]
    pub fn new(frequency_hz: f32, duration: Duration) -> Self {
        Self {
            frequency_hz,
            duration,
        }
    }
}

impl SoundPlayer for RodioSoundPlayer {
    fn play_tone(&self) -> Result<(), SoundError> {
        let frequency = self.frequency_hz;
        let duration = self.duration;

        std::thread::Builder::new()
            .name("studyhive-tone".to_string())
            .spawn(move || {
                if let Err(e) = play_blocking(frequency, duration) {
                    warn!("Tone playback failed: {} ({})", e, e.suggestion());
                }
            })
            .map(|_| ())
            .map_err(|e| SoundError::PlaybackError(e.to_string()))
    }
}

fn play_blocking(frequency: f32, duration: Duration) -> Result<(), SoundError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| SoundError::DeviceNotAvailable(e.to_string()))?;
    let sink = Sink::try_new(&handle).map_err(|e| SoundError::StreamError(e.to_string()))?;

    let tone = SineWave::new(frequency)
        .take_duration(duration)
        .amplify(VOLUME);
    sink.append(tone);
    sink.sleep_until_end();

    debug!("Tone played ({} Hz, {:?})", frequency, duration);
    Ok(())
}
