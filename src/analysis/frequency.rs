//! Frequency analyzer: audio input → spectrum bytes → feature vector.

use crossbeam_channel::Sender;
use std::time::{Duration, Instant};

use super::spectrum::SpectrumAnalyser;
use crate::error::{CaptureError, ExtractionError, Result};
use crate::features::{FeatureVector, HARMONIC_BANDS};
use crate::input::AudioInput;
use crate::params::AnalyzerConfig;
use crate::schedule::RepeatingTimer;

/// Fold one frame of byte magnitudes into a feature vector
///
/// * intensity = mean(bins) / 255
/// * harmonics[i] = mean of the i-th of 5 equal-width sub-ranges / 255.
///   Width is `len / 5` (integer division); trailing bins that do not
///   fill a whole band are ignored.
/// * resonance = Σ(i·m) / Σm / len, or 0 when Σm = 0
pub fn extract_features(bins: &[u8]) -> FeatureVector {
    if bins.is_empty() {
        return FeatureVector::silent();
    }

    let len = bins.len();
    let total: u64 = bins.iter().map(|&b| b as u64).sum();
    let intensity = total as f32 / len as f32 / 255.0;

    let width = len / HARMONIC_BANDS;
    let mut harmonics = [0.0; HARMONIC_BANDS];
    if width > 0 {
        for (band, value) in harmonics.iter_mut().enumerate() {
            let slice = &bins[band * width..(band + 1) * width];
            let sum: u64 = slice.iter().map(|&b| b as u64).sum();
            *value = sum as f32 / width as f32 / 255.0;
        }
    }

    let resonance = if total == 0 {
        0.0
    } else {
        let weighted: u64 = bins
            .iter()
            .enumerate()
            .map(|(i, &b)| i as u64 * b as u64)
            .sum();
        weighted as f32 / total as f32 / len as f32
    };

    FeatureVector {
        intensity,
        harmonics,
        resonance,
    }
    .clamped()
}

/// Continuous frequency-domain feature extraction over one audio input
///
/// Lifecycle: `initialize` → `start_analysis` → `tick`… → `stop_analysis`
/// → `cleanup`. Analysis can be restarted after a stop; `cleanup` detaches
/// the input and the analyzer can then be initialized again.
pub struct FrequencyAnalyzer {
    config: AnalyzerConfig,
    input: Option<Box<dyn AudioInput>>,
    spectrum: Option<SpectrumAnalyser>,
    timer: RepeatingTimer,
    sink: Option<Sender<FeatureVector>>,
}

impl FrequencyAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let timer = RepeatingTimer::new(Duration::from_millis(config.frame_interval_ms));
        Self {
            config,
            input: None,
            spectrum: None,
            timer,
            sink: None,
        }
    }

    /// Attach an input stream to a fresh spectrum node
    ///
    /// The input is released before returning an error.
    pub fn initialize(&mut self, mut input: Box<dyn AudioInput>) -> Result<()> {
        if input.is_released() || input.sample_rate() == 0 {
            input.release();
            return Err(CaptureError::Device(
                "audio input cannot be attached to the analysis node".to_string(),
            ));
        }
        if let Err(e) = self.config.validate() {
            input.release();
            return Err(e.into());
        }

        if self.input.is_some() {
            tracing::warn!("frequency analyzer re-initialized; releasing previous input");
            self.cleanup();
        }

        tracing::debug!(
            fft_size = self.config.fft_size,
            bins = self.config.bin_count(),
            sample_rate = input.sample_rate(),
            "frequency analyzer initialized"
        );
        self.spectrum = Some(SpectrumAnalyser::new(&self.config));
        self.input = Some(input);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.input.is_some()
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Begin the frame-synchronized sampling loop
    ///
    /// Every due `tick` sends one vector to `sink`. The first sample is
    /// taken on the first tick at or after `now`.
    pub fn start_analysis(&mut self, sink: Sender<FeatureVector>, now: Instant) -> Result<()> {
        if !self.is_initialized() {
            return Err(CaptureError::Device(
                "frequency analyzer is not initialized".to_string(),
            ));
        }
        self.sink = Some(sink);
        self.timer.start_immediate(now);
        Ok(())
    }

    /// Run one loop iteration if one is due
    ///
    /// Returns the vector that was published, if any. A disconnected sink
    /// stops the loop.
    pub fn tick(&mut self, now: Instant) -> Option<FeatureVector> {
        if !self.timer.poll(now) {
            return None;
        }

        let features = self.sample().unwrap_or_else(|e| {
            tracing::debug!("frequency extraction failed: {}", e);
            FeatureVector::neutral()
        });

        let disconnected = self
            .sink
            .as_ref()
            .is_some_and(|sink| sink.send(features).is_err());
        if disconnected {
            tracing::debug!("feature receiver dropped; stopping analysis");
            self.stop_analysis();
        }
        Some(features)
    }

    /// Read the current spectrum and extract features from it
    pub fn sample(&mut self) -> std::result::Result<FeatureVector, ExtractionError> {
        let (Some(input), Some(spectrum)) = (self.input.as_ref(), self.spectrum.as_mut()) else {
            return Err(ExtractionError::NoData);
        };
        let samples = input.latest_samples(self.config.fft_size);
        let bins = spectrum.byte_frequency_data(&samples);
        Ok(extract_features(&bins))
    }

    /// Cancel the pending reschedule. Idempotent.
    pub fn stop_analysis(&mut self) {
        self.timer.cancel();
        self.sink = None;
    }

    /// Stop, release the input stream and drop the spectrum node. Idempotent.
    pub fn cleanup(&mut self) {
        self.stop_analysis();
        if let Some(mut input) = self.input.take() {
            input.release();
            tracing::debug!("frequency analyzer input released");
        }
        self.spectrum = None;
    }
}

impl Drop for FrequencyAnalyzer {
    fn drop(&mut self) {
        self.cleanup();
    }
}
