//! Input device adapters.
//!
//! A capture session owns at most one audio input or one frame source.
//! Both are released explicitly on every exit path; `release` must be
//! safe to call more than once.

mod frames;
mod microphone;
mod wav;

pub use frames::{ImageSequenceSource, StillImageSource};
pub use microphone::MicrophoneInput;
pub use wav::WavFileInput;

use image::RgbaImage;
use std::path::PathBuf;

use crate::error::{CaptureError, Result};

/// Live mono sample stream
pub trait AudioInput {
    /// Sample rate of the samples returned by `latest_samples` (Hz)
    fn sample_rate(&self) -> u32;

    /// The most recent `count` samples, oldest first (fewer if not yet available)
    fn latest_samples(&self, count: usize) -> Vec<f32>;

    /// Stop the underlying stream. Idempotent.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}

/// Live video frame stream
pub trait FrameSource {
    /// Current frame at native resolution, `None` if none is available
    fn current_frame(&mut self) -> Option<RgbaImage>;

    /// Stop the underlying stream. Idempotent.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}

/// Grants (or denies) access to input devices
pub trait DeviceProvider {
    fn acquire_microphone(&mut self) -> Result<Box<dyn AudioInput>>;

    fn acquire_camera(&mut self) -> Result<Box<dyn FrameSource>>;
}

/// Devices available to the command-line binary
///
/// Audio comes from a WAV file when one is configured, otherwise from the
/// default input device. Video comes from a directory of still images.
#[derive(Debug, Clone, Default)]
pub struct SystemDevices {
    /// Replay this file instead of opening the microphone
    pub wav: Option<PathBuf>,

    /// Directory of frames standing in for a camera
    pub frames_dir: Option<PathBuf>,

    /// Frame rate of the replayed image sequence
    pub fps: f32,

    /// Samples retained from the microphone
    pub buffer_len: usize,
}

impl DeviceProvider for SystemDevices {
    fn acquire_microphone(&mut self) -> Result<Box<dyn AudioInput>> {
        match &self.wav {
            Some(path) => Ok(Box::new(WavFileInput::open(path)?)),
            None => Ok(Box::new(MicrophoneInput::open(self.buffer_len.max(1))?)),
        }
    }

    fn acquire_camera(&mut self) -> Result<Box<dyn FrameSource>> {
        let dir = self.frames_dir.as_ref().ok_or_else(|| {
            CaptureError::Permission("no camera frame source configured".to_string())
        })?;
        Ok(Box::new(ImageSequenceSource::open(dir, self.fps)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_without_frames_dir_is_denied() {
        let mut devices = SystemDevices::default();
        let err = devices.acquire_camera().err().unwrap();
        assert!(matches!(err, CaptureError::Permission(_)));
    }

    #[test]
    fn test_missing_wav_is_denied() {
        let mut devices = SystemDevices {
            wav: Some(PathBuf::from("/definitely/not/here.wav")),
            ..Default::default()
        };
        let err = devices.acquire_microphone().err().unwrap();
        assert!(matches!(err, CaptureError::Permission(_)));
    }
}
