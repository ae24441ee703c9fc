//! Normalized feature values shared by analyzers, tones and visuals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of harmonic bands (band index ↔ voice index ↔ ring index)
pub const HARMONIC_BANDS: usize = 5;

/// Feature snapshot produced on every analysis tick
///
/// All values are in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Overall signal energy
    pub intensity: f32,

    /// Banded sub-features, lowest band first
    pub harmonics: [f32; HARMONIC_BANDS],

    /// Spectral-centroid-like (audio) or expression-derived (video) weighting
    pub resonance: f32,
}

impl FeatureVector {
    /// Fallback used before the first tick and whenever extraction fails
    pub fn neutral() -> Self {
        Self {
            intensity: 0.5,
            harmonics: [0.5; HARMONIC_BANDS],
            resonance: 0.5,
        }
    }

    pub fn silent() -> Self {
        Self {
            intensity: 0.0,
            harmonics: [0.0; HARMONIC_BANDS],
            resonance: 0.0,
        }
    }

    /// Copy with every field clamped to [0, 1] (NaN becomes 0)
    pub fn clamped(self) -> Self {
        Self {
            intensity: unit(self.intensity),
            harmonics: self.harmonics.map(unit),
            resonance: unit(self.resonance),
        }
    }

    /// Mean of the harmonic bands
    pub fn harmonic_mean(&self) -> f32 {
        self.harmonics.iter().sum::<f32>() / HARMONIC_BANDS as f32
    }

    pub fn is_normalized(&self) -> bool {
        let in_range = |v: f32| (0.0..=1.0).contains(&v);
        in_range(self.intensity)
            && in_range(self.resonance)
            && self.harmonics.iter().all(|&h| in_range(h))
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Pixel-derived metrics of a single video frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacialMetrics {
    /// Mean luminance, [0, 1]
    pub brightness: f32,

    /// Scaled RMS luminance deviation, [0, 1]
    pub contrast: f32,

    /// Left/right mirror similarity, [0, 1]
    pub symmetry: f32,

    /// Scaled contrast of the lower part of the frame, [0, 1]
    pub expression_intensity: f32,

    /// Brightness mapped to [-1, 1].
    ///
    /// A crude lighting proxy. It does not recognize emotion.
    pub emotional_valence: f32,
}

impl FacialMetrics {
    pub fn neutral() -> Self {
        Self {
            brightness: 0.5,
            contrast: 0.5,
            symmetry: 0.5,
            expression_intensity: 0.5,
            emotional_valence: 0.0,
        }
    }

    pub fn clamped(self) -> Self {
        let valence = if self.emotional_valence.is_nan() {
            0.0
        } else {
            self.emotional_valence.clamp(-1.0, 1.0)
        };
        Self {
            brightness: unit(self.brightness),
            contrast: unit(self.contrast),
            symmetry: unit(self.symmetry),
            expression_intensity: unit(self.expression_intensity),
            emotional_valence: valence,
        }
    }

    /// Fold the metrics into the shared feature layout
    ///
    /// Harmonic slots: brightness, contrast, symmetry, expression, valence
    /// (shifted to [0, 1]). Resonance blends valence and symmetry by how
    /// much expression the frame shows.
    pub fn to_feature_vector(&self) -> FeatureVector {
        let m = self.clamped();
        let valence01 = (m.emotional_valence + 1.0) / 2.0;
        FeatureVector {
            intensity: (m.brightness + m.expression_intensity) / 2.0,
            harmonics: [
                m.brightness,
                m.contrast,
                m.symmetry,
                m.expression_intensity,
                valence01,
            ],
            resonance: m.expression_intensity * valence01
                + (1.0 - m.expression_intensity) * m.symmetry,
        }
        .clamped()
    }
}

impl Default for FacialMetrics {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Input that feeds a capture session
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Microphone (or WAV playback) through the frequency analyzer
    Audio,
    /// Frame source through the facial metric extractor
    Video,
    /// Closed-form synthetic generator, no device
    Ambient,
}

impl CaptureMode {
    pub const ALL: [CaptureMode; 3] = [CaptureMode::Audio, CaptureMode::Video, CaptureMode::Ambient];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Audio => "audio",
            CaptureMode::Video => "video",
            CaptureMode::Ambient => "ambient",
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "audio" | "voice" => Ok(CaptureMode::Audio),
            "video" | "facial" => Ok(CaptureMode::Video),
            "ambient" => Ok(CaptureMode::Ambient),
            other => Err(format!(
                "unknown capture mode '{}' (expected audio, video or ambient)",
                other
            )),
        }
    }
}

fn unit(v: f32) -> f32 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_bounds_every_field() {
        let v = FeatureVector {
            intensity: 1.7,
            harmonics: [-0.2, 0.3, 2.0, f32::NAN, 1.0],
            resonance: -5.0,
        }
        .clamped();

        assert!(v.is_normalized());
        assert_eq!(v.intensity, 1.0);
        assert_eq!(v.harmonics, [0.0, 0.3, 1.0, 0.0, 1.0]);
        assert_eq!(v.resonance, 0.0);
    }

    #[test]
    fn test_neutral_metrics_map_to_mid_features() {
        let v = FacialMetrics::neutral().to_feature_vector();
        assert!(v.is_normalized());
        assert_eq!(v.intensity, 0.5);
        assert_eq!(v.harmonics, [0.5; HARMONIC_BANDS]);
        assert_eq!(v.resonance, 0.5);
    }

    #[test]
    fn test_facial_mapping_stays_normalized_at_extremes() {
        let dark = FacialMetrics {
            brightness: 0.0,
            contrast: 0.0,
            symmetry: 1.0,
            expression_intensity: 0.0,
            emotional_valence: -1.0,
        };
        let v = dark.to_feature_vector();
        assert!(v.is_normalized());
        assert_eq!(v.harmonics[4], 0.0);
        // No expression: resonance follows symmetry
        assert_eq!(v.resonance, 1.0);
    }

    #[test]
    fn test_valence_clamped_to_signed_unit() {
        let m = FacialMetrics {
            emotional_valence: 3.0,
            ..FacialMetrics::neutral()
        }
        .clamped();
        assert_eq!(m.emotional_valence, 1.0);
    }

    #[test]
    fn test_capture_mode_parsing() {
        assert_eq!("voice".parse::<CaptureMode>(), Ok(CaptureMode::Audio));
        assert_eq!("Facial".parse::<CaptureMode>(), Ok(CaptureMode::Video));
        assert_eq!("ambient".parse::<CaptureMode>(), Ok(CaptureMode::Ambient));
        assert!("radio".parse::<CaptureMode>().is_err());
    }

    #[test]
    fn test_capture_mode_serializes_lowercase() {
        let json = serde_json::to_string(&CaptureMode::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }
}
