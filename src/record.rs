//! Soul Print records and the signatures derived for them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

use crate::analysis::StillFrame;
use crate::features::{CaptureMode, FeatureVector, HARMONIC_BANDS};
use crate::params::ToneMapping;
use crate::tone::NoteDuration;

/// Colour and shape summary of a session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisualSignature {
    /// Degrees, [0, 360]
    pub hue: f32,

    /// Percent, [40, 100]
    pub saturation: f32,

    /// Mean harmonic energy, [0, 1]
    pub complexity: f32,

    /// Per-band shape weights, [0, 1]
    pub pattern: [f32; HARMONIC_BANDS],
}

impl VisualSignature {
    pub fn from_features(features: &FeatureVector) -> Self {
        let f = features.clamped();
        Self {
            hue: f.resonance * 360.0,
            saturation: 40.0 + f.intensity * 60.0,
            complexity: f.harmonic_mean(),
            pattern: f.harmonics.map(|h| h * (1.0 + f.intensity) / 2.0),
        }
    }
}

/// Sound summary of a session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AudioSignature {
    /// Fundamental (Hz)
    pub base_frequency: f32,

    /// Weighted partials of the fundamental (Hz)
    pub harmonic_series: [f32; HARMONIC_BANDS],

    /// [0, 1]
    pub resonance_depth: f32,

    /// One note value per band; busier bands subdivide faster
    pub rhythm_pattern: Vec<NoteDuration>,
}

impl AudioSignature {
    pub fn from_features(features: &FeatureVector, mapping: &ToneMapping) -> Self {
        let f = features.clamped();
        let base = mapping.fundamental(f.intensity);

        let mut harmonic_series = [0.0; HARMONIC_BANDS];
        for (i, (slot, &h)) in harmonic_series.iter_mut().zip(f.harmonics.iter()).enumerate() {
            *slot = base * (i + 1) as f32 * (0.5 + h / 2.0);
        }

        let rhythm_pattern = f
            .harmonics
            .iter()
            .map(|&h| {
                if h > 0.66 {
                    NoteDuration::Sixteenth
                } else if h > 0.33 {
                    NoteDuration::Eighth
                } else {
                    NoteDuration::Quarter
                }
            })
            .collect();

        Self {
            base_frequency: base,
            harmonic_series,
            resonance_depth: f.resonance,
            rhythm_pattern,
        }
    }
}

/// Immutable record of one capture session
#[derive(Clone, Debug, Serialize)]
pub struct SoulPrint {
    id: Uuid,
    timestamp: DateTime<Utc>,
    mode: CaptureMode,
    features: FeatureVector,
    visual: VisualSignature,
    audio: AudioSignature,
    #[serde(skip_serializing_if = "Option::is_none")]
    still_frame: Option<StillFrame>,
    duration_ms: u64,
}

impl SoulPrint {
    /// Assemble a record from a session's final features
    pub fn from_features(
        mode: CaptureMode,
        features: FeatureVector,
        still_frame: Option<StillFrame>,
        duration: Duration,
        mapping: &ToneMapping,
    ) -> Self {
        let features = features.clamped();
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            mode,
            visual: VisualSignature::from_features(&features),
            audio: AudioSignature::from_features(&features, mapping),
            features,
            still_frame,
            duration_ms: duration.as_millis() as u64,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn visual(&self) -> &VisualSignature {
        &self.visual
    }

    pub fn audio(&self) -> &AudioSignature {
        &self.audio
    }

    pub fn still_frame(&self) -> Option<&StillFrame> {
        self.still_frame.as_ref()
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Short id for display
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_signature_ranges() {
        let v = VisualSignature::from_features(&FeatureVector {
            intensity: 1.0,
            harmonics: [1.0, 0.0, 0.5, 0.5, 1.0],
            resonance: 0.25,
        });

        assert_eq!(v.hue, 90.0);
        assert_eq!(v.saturation, 100.0);
        assert!((v.complexity - 0.6).abs() < 1e-6);
        assert_eq!(v.pattern, [1.0, 0.0, 0.5, 0.5, 1.0]);
    }

    #[test]
    fn test_audio_signature() {
        let mapping = ToneMapping::default();
        let a = AudioSignature::from_features(
            &FeatureVector {
                intensity: 0.0,
                harmonics: [1.0, 0.0, 0.5, 0.2, 0.9],
                resonance: 0.7,
            },
            &mapping,
        );

        assert_eq!(a.base_frequency, 110.0);
        assert_eq!(a.harmonic_series[0], 110.0);
        assert_eq!(a.harmonic_series[1], 110.0);
        assert_eq!(a.resonance_depth, 0.7);
        assert_eq!(
            a.rhythm_pattern,
            vec![
                NoteDuration::Sixteenth,
                NoteDuration::Quarter,
                NoteDuration::Eighth,
                NoteDuration::Quarter,
                NoteDuration::Sixteenth,
            ]
        );
    }

    #[test]
    fn test_soul_print_ids_are_unique() {
        let mapping = ToneMapping::default();
        let a = SoulPrint::from_features(
            CaptureMode::Ambient,
            FeatureVector::neutral(),
            None,
            Duration::from_secs(1),
            &mapping,
        );
        let b = SoulPrint::from_features(
            CaptureMode::Ambient,
            FeatureVector::neutral(),
            None,
            Duration::from_secs(1),
            &mapping,
        );

        assert_ne!(a.id(), b.id());
        assert_eq!(a.short_id().len(), 8);
        assert_eq!(a.duration(), Duration::from_secs(1));
    }

    #[test]
    fn test_serializes_without_frame_bytes() {
        let mapping = ToneMapping::default();
        let print = SoulPrint::from_features(
            CaptureMode::Video,
            FeatureVector::neutral(),
            Some(StillFrame {
                width: 2,
                height: 2,
                format: "jpeg",
                bytes: vec![1, 2, 3],
            }),
            Duration::from_millis(1500),
            &mapping,
        );

        let json = serde_json::to_value(&print).unwrap();
        assert_eq!(json["mode"], "video");
        assert_eq!(json["duration_ms"], 1500);
        assert_eq!(json["still_frame"]["width"], 2);
        assert!(json["still_frame"].get("bytes").is_none());
        assert_eq!(json["audio"]["rhythm_pattern"][0], "8n");
    }
}
