//! Feature extraction configuration.

use crate::error::ConfigError;

/// Frequency-domain analysis configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// FFT window size (must be power of 2)
    /// 256-point transform = 128 frequency bins
    pub fft_size: usize,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_decibels: f32,

    /// Exponential smoothing between frames, in [0, 1)
    /// 0.0 = no smoothing
    pub smoothing_time_constant: f32,

    /// Sampling interval of the analysis loop (milliseconds)
    /// 16 ms ≈ one 60 Hz display frame
    pub frame_interval_ms: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            min_decibels: -100.0,
            max_decibels: -30.0,
            smoothing_time_constant: 0.8,
            frame_interval_ms: 16,
        }
    }
}

impl AnalyzerConfig {
    /// Number of frequency bins produced per frame
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two() || self.fft_size < 32 {
            return Err(ConfigError::Invalid(format!(
                "FFT size must be a power of 2 >= 32, got {}",
                self.fft_size
            )));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(ConfigError::Invalid(format!(
                "min_decibels ({}) must be below max_decibels ({})",
                self.min_decibels, self.max_decibels
            )));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::Invalid(format!(
                "smoothing time constant must be in [0, 1), got {}",
                self.smoothing_time_constant
            )));
        }
        if self.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "frame interval must be > 0 ms".to_string(),
            ));
        }
        Ok(())
    }
}

/// Pixel-based facial metric configuration
#[derive(Debug, Clone)]
pub struct FacialConfig {
    /// Multiplier applied to RMS luminance deviation before clamping
    pub contrast_scale: f32,

    /// Fraction of the frame height (from the bottom) used for expression
    pub expression_region: f32,

    /// Multiplier applied to the region's RMS deviation before clamping
    pub expression_scale: f32,

    /// JPEG quality for captured still frames (1-100)
    pub jpeg_quality: u8,
}

impl Default for FacialConfig {
    fn default() -> Self {
        Self {
            contrast_scale: 4.0,
            expression_region: 0.4,
            expression_scale: 2.0,
            jpeg_quality: 80,
        }
    }
}

impl FacialConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.expression_region > 0.0 && self.expression_region <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "expression region must be in (0, 1], got {}",
                self.expression_region
            )));
        }
        if self.contrast_scale <= 0.0 || self.expression_scale <= 0.0 {
            return Err(ConfigError::Invalid(
                "contrast and expression scales must be > 0".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "JPEG quality must be in 1..=100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_count_is_half_fft_size() {
        let config = AnalyzerConfig::default();
        assert_eq!(config.fft_size, 256);
        assert_eq!(config.bin_count(), 128);
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = AnalyzerConfig {
            fft_size: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_decibel_range() {
        let config = AnalyzerConfig {
            min_decibels: -20.0,
            max_decibels: -40.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_facial_defaults() {
        let config = FacialConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.contrast_scale, 4.0);

        let bad = FacialConfig {
            expression_region: 0.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
