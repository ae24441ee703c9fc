//! WAV file replayed in real time as a stand-in microphone.

use std::path::Path;
use std::time::{Duration, Instant};

use super::AudioInput;
use crate::error::{CaptureError, Result};

/// Mono samples served at wall-clock rate, looping
pub struct WavFileInput {
    samples: Vec<f32>,
    sample_rate: u32,
    started: Instant,
    released: bool,
}

impl WavFileInput {
    /// Decode `path` to mono f32
    ///
    /// A file that cannot be opened is reported as a permission failure,
    /// matching what a denied microphone looks like to the caller.
    pub fn open(path: &Path) -> Result<Self> {
        let reader = hound::WavReader::open(path).map_err(|e| {
            CaptureError::Permission(format!("Cannot open {}: {}", path.display(), e))
        })?;

        let spec = reader.spec();
        let channels = spec.channels.max(1) as usize;

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| CaptureError::Device(format!("Bad WAV data: {}", e)))?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| CaptureError::Device(format!("Bad WAV data: {}", e)))?
            }
        };

        let samples: Vec<f32> = interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect();

        tracing::info!(
            path = %path.display(),
            sample_rate = spec.sample_rate,
            seconds = samples.len() as f32 / spec.sample_rate.max(1) as f32,
            "wav input opened"
        );

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    /// Serve already-decoded mono samples
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
            started: Instant::now(),
            released: false,
        }
    }

    /// The `count` samples that precede playback position `elapsed`
    pub fn samples_at(&self, elapsed: Duration, count: usize) -> Vec<f32> {
        if self.released || self.samples.is_empty() || count == 0 {
            return Vec::new();
        }
        let len = self.samples.len();
        let played = (elapsed.as_secs_f64() * self.sample_rate as f64) as usize;
        let available = played.min(count);
        let end = played % len;
        let start = (end + len - available % len) % len;

        (0..available)
            .map(|k| self.samples[(start + k) % len])
            .collect()
    }
}

impl AudioInput for WavFileInput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn latest_samples(&self, count: usize) -> Vec<f32> {
        self.samples_at(self.started.elapsed(), count)
    }

    fn release(&mut self) {
        self.released = true;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_played_at_start() {
        let input = WavFileInput::from_samples(vec![1.0; 100], 100);
        assert!(input.samples_at(Duration::ZERO, 10).is_empty());
    }

    #[test]
    fn test_samples_follow_playback_position() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let input = WavFileInput::from_samples(samples, 100);

        // 0.5 s at 100 Hz = 50 samples played
        let window = input.samples_at(Duration::from_millis(500), 4);
        assert_eq!(window, vec![46.0, 47.0, 48.0, 49.0]);
    }

    #[test]
    fn test_playback_loops() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let input = WavFileInput::from_samples(samples, 100);

        let window = input.samples_at(Duration::from_millis(1020), 4);
        assert_eq!(window, vec![98.0, 99.0, 0.0, 1.0]);
    }

    #[test]
    fn test_short_clip_longer_window() {
        let samples: Vec<f32> = (0..100).map(|i| i as f32).collect();
        let input = WavFileInput::from_samples(samples, 100);

        // Window spans the clip more than twice
        let window = input.samples_at(Duration::from_secs(3), 256);
        assert_eq!(window.len(), 256);
        assert_eq!(window[0], 44.0);
        assert_eq!(window[56], 0.0);
        assert_eq!(window[255], 99.0);
    }

    #[test]
    fn test_open_reads_int_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..800 {
            writer.write_sample(i16::MAX / 2).unwrap();
            writer.write_sample(i16::MAX / 2).unwrap();
        }
        writer.finalize().unwrap();

        let input = WavFileInput::open(&path).unwrap();
        assert_eq!(input.sample_rate(), 8000);
        let window = input.samples_at(Duration::from_millis(50), 16);
        assert_eq!(window.len(), 16);
        assert!(window.iter().all(|&s| (s - 0.5).abs() < 0.01));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut input = WavFileInput::from_samples(vec![0.1; 10], 10);
        input.release();
        input.release();
        assert!(input.is_released());
        assert!(input.samples_at(Duration::from_secs(1), 5).is_empty());
    }
}
