//! Capture session timing.

use std::time::Duration;

use crate::error::ConfigError;

/// Periods of the two independent loops of a capture session
#[derive(Debug, Clone)]
pub struct CaptureCadence {
    /// Video frame poll interval (milliseconds)
    pub video_poll_ms: u64,

    /// Synthetic ambient generator interval (milliseconds)
    pub ambient_tick_ms: u64,

    /// Tone trigger interval (milliseconds)
    pub sound_interval_ms: u64,
}

impl Default for CaptureCadence {
    fn default() -> Self {
        Self {
            video_poll_ms: 100,
            ambient_tick_ms: 150,
            sound_interval_ms: 800,
        }
    }
}

impl CaptureCadence {
    pub fn video_poll(&self) -> Duration {
        Duration::from_millis(self.video_poll_ms)
    }

    pub fn ambient_tick(&self) -> Duration {
        Duration::from_millis(self.ambient_tick_ms)
    }

    pub fn sound_interval(&self) -> Duration {
        Duration::from_millis(self.sound_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.video_poll_ms == 0 || self.ambient_tick_ms == 0 || self.sound_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "capture intervals must be > 0 ms".to_string(),
            ));
        }
        Ok(())
    }
}
