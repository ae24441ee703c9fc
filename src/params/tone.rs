//! Feature → tone parameter mapping.

use crate::error::ConfigError;
use crate::tone::NoteDuration;

/// Mapping from feature values to tone generator parameters
#[derive(Debug, Clone)]
pub struct ToneMapping {
    /// Fundamental at zero intensity (Hz)
    pub base_frequency_hz: f32,

    /// Fundamental added at full intensity (Hz)
    /// Formula: base = base_frequency_hz + intensity * frequency_span_hz
    pub frequency_span_hz: f32,

    /// Voice amplitude at harmonic weight 0 (dB)
    pub min_amplitude_db: f32,

    /// Voice amplitude at harmonic weight 1 (dB)
    pub max_amplitude_db: f32,

    /// Voices below this amplitude are not triggered (dB)
    pub floor_db: f32,

    /// Length of each triggered note
    pub note: NoteDuration,

    /// Delay between successive voices of one trigger (milliseconds)
    pub voice_stagger_ms: u64,

    /// Tempo used to convert note values to seconds (BPM)
    pub tempo_bpm: f32,

    /// Low-pass cutoff of the shared effects chain (Hz)
    pub filter_cutoff_hz: f32,

    /// Plate reverb mix of the shared effects chain, in [0, 1]
    pub reverb_mix: f32,
}

impl Default for ToneMapping {
    fn default() -> Self {
        Self {
            base_frequency_hz: 110.0,
            frequency_span_hz: 330.0,
            min_amplitude_db: -36.0,
            max_amplitude_db: -12.0,
            floor_db: -34.0,
            note: NoteDuration::Eighth,
            voice_stagger_ms: 30,
            tempo_bpm: 120.0,
            filter_cutoff_hz: 2000.0,
            reverb_mix: 0.2,
        }
    }
}

impl ToneMapping {
    /// Fundamental frequency for a given intensity
    pub fn fundamental(&self, intensity: f32) -> f32 {
        self.base_frequency_hz + intensity.clamp(0.0, 1.0) * self.frequency_span_hz
    }

    /// Voice amplitude for a given harmonic weight
    pub fn amplitude_db(&self, weight: f32) -> f32 {
        let w = weight.clamp(0.0, 1.0);
        self.min_amplitude_db + w * (self.max_amplitude_db - self.min_amplitude_db)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_frequency_hz <= 0.0 || self.frequency_span_hz < 0.0 {
            return Err(ConfigError::Invalid(
                "tone frequencies must be positive".to_string(),
            ));
        }
        if self.min_amplitude_db > self.max_amplitude_db {
            return Err(ConfigError::Invalid(format!(
                "min amplitude ({} dB) above max amplitude ({} dB)",
                self.min_amplitude_db, self.max_amplitude_db
            )));
        }
        if self.tempo_bpm <= 0.0 {
            return Err(ConfigError::Invalid("tempo must be > 0 BPM".to_string()));
        }
        if !(0.0..=1.0).contains(&self.reverb_mix) {
            return Err(ConfigError::Invalid(format!(
                "reverb mix must be in [0, 1], got {}",
                self.reverb_mix
            )));
        }
        Ok(())
    }
}

/// Audio constants (compile-time, match Glicol engine setup)
pub mod audio_constants {
    /// Audio block size (samples per buffer)
    /// 128 = 2.9ms @ 44.1kHz
    pub const BLOCK_SIZE: usize = 128;

    /// Hard output limit applied after the effects chain
    pub const OUTPUT_LIMIT: f32 = 0.5;
}
