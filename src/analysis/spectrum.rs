//! Frequency-domain node producing byte magnitudes per bin.
//!
//! Mirrors the behaviour of a browser `AnalyserNode`: Blackman window,
//! FFT, exponential smoothing across frames, then decibels mapped
//! linearly onto 0..=255.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

use crate::params::AnalyzerConfig;

/// Stateful spectrum node (smoothing carries over between frames)
pub struct SpectrumAnalyser {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    min_decibels: f32,
    max_decibels: f32,
    smoothing: f32,
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    pub fn new(config: &AnalyzerConfig) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = (0..config.fft_size)
            .map(|i| blackman_window(i, config.fft_size))
            .collect();

        Self {
            fft,
            fft_size: config.fft_size,
            min_decibels: config.min_decibels,
            max_decibels: config.max_decibels,
            smoothing: config.smoothing_time_constant,
            window,
            scratch: vec![Complex::new(0.0, 0.0); config.fft_size],
            smoothed: vec![0.0; config.fft_size / 2],
        }
    }

    /// Number of bins returned by `byte_frequency_data`
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Analyse the most recent `fft_size` samples
    ///
    /// Shorter input is zero-padded at the front so the newest sample
    /// always lands at the end of the window.
    pub fn byte_frequency_data(&mut self, samples: &[f32]) -> Vec<u8> {
        let start = samples.len().saturating_sub(self.fft_size);
        let recent = &samples[start..];
        let pad = self.fft_size - recent.len();

        for (i, slot) in self.scratch.iter_mut().enumerate() {
            let sample = if i < pad { 0.0 } else { recent[i - pad] };
            *slot = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut self.scratch);

        let norm = 1.0 / self.fft_size as f32;
        let range = self.max_decibels - self.min_decibels;

        self.smoothed
            .iter_mut()
            .zip(self.scratch.iter())
            .map(|(prev, bin)| {
                let magnitude = bin.norm() * norm;
                *prev = self.smoothing * *prev + (1.0 - self.smoothing) * magnitude;
                to_byte(*prev, self.min_decibels, range)
            })
            .collect()
    }

    /// Forget smoothing history
    pub fn reset(&mut self) {
        self.smoothed.iter_mut().for_each(|v| *v = 0.0);
    }
}

fn to_byte(magnitude: f32, min_db: f32, range_db: f32) -> u8 {
    if magnitude <= 0.0 {
        return 0;
    }
    let db = 20.0 * magnitude.log10();
    let scaled = 255.0 * (db - min_db) / range_db;
    scaled.clamp(0.0, 255.0) as u8
}

/// Blackman window function (a0 = 0.42, a1 = 0.5, a2 = 0.08)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    let x = index as f32 / size as f32;
    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq_hz: f32, sample_rate: f32, len: usize, amp: f32) -> Vec<f32> {
        (0..len)
            .map(|i| amp * (2.0 * PI * freq_hz * i as f32 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_blackman_window() {
        let size = 256;

        // Blackman window is ~0 at the start and 1 at the center
        assert!(blackman_window(0, size).abs() < 0.001);
        assert!((blackman_window(size / 2, size) - 1.0).abs() < 0.001);
    }

    #[test]
    fn test_silence_gives_zero_bytes() {
        let mut analyser = SpectrumAnalyser::new(&AnalyzerConfig::default());
        let bins = analyser.byte_frequency_data(&[0.0; 256]);

        assert_eq!(bins.len(), 128);
        assert!(bins.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_short_input_is_padded() {
        let mut analyser = SpectrumAnalyser::new(&AnalyzerConfig::default());
        let bins = analyser.byte_frequency_data(&[0.5; 10]);
        assert_eq!(bins.len(), analyser.bin_count());
    }

    #[test]
    fn test_sine_peaks_at_expected_bin() {
        let config = AnalyzerConfig {
            smoothing_time_constant: 0.0,
            ..Default::default()
        };
        let mut analyser = SpectrumAnalyser::new(&config);

        // 44100 / 256 ≈ 172.3 Hz per bin; bin 20 ≈ 3445 Hz
        let bin_hz = 44100.0 / 256.0;
        let samples = sine(20.0 * bin_hz, 44100.0, 256, 0.8);
        let bins = analyser.byte_frequency_data(&samples);

        let peak = bins
            .iter()
            .enumerate()
            .max_by_key(|(_, &b)| b)
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 20);
        assert!(bins[20] > 200);
    }

    #[test]
    fn test_smoothing_decays_after_signal_stops() {
        let mut analyser = SpectrumAnalyser::new(&AnalyzerConfig::default());
        let bin_hz = 44100.0 / 256.0;
        let loud = sine(10.0 * bin_hz, 44100.0, 256, 0.8);

        let first = analyser.byte_frequency_data(&loud)[10];
        let after_silence = analyser.byte_frequency_data(&[0.0; 256])[10];

        // Smoothed magnitude decays but is still audible one frame later
        assert!(after_silence > 0);
        assert!(after_silence <= first);

        analyser.reset();
        assert_eq!(analyser.byte_frequency_data(&[0.0; 256])[10], 0);
    }
}
