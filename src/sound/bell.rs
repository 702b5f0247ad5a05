//! Terminal bell fallback used when the `audio` feature is off.

use std::io::Write;

use tracing::debug;

use super::error::SoundError;
use super::SoundPlayer;

/// Rings the terminal bell on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct BellSoundPlayer;

impl SoundPlayer for BellSoundPlayer {
    fn play_tone(&self) -> Result<(), SoundError> {
        let mut stderr = std::io::stderr().lock();
        stderr
            .write_all(b"\x07")
            .and_then(|()| stderr.flush())
            .map_err(|e| SoundError::PlaybackError(e.to_string()))?;
        debug!("Terminal bell rung");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bell_does_not_panic() {
        let _ = BellSoundPlayer.play_tone();
    }
}
