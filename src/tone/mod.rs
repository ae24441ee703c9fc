//! Tone generation from feature vectors.
//!
//! The synthesis engine is a collaborator behind `ToneSink`: it receives
//! (frequency, duration, amplitude, optional offset) tuples and renders
//! them through a shared filter + reverb chain.

mod synthesis;

pub use synthesis::{compose, GlicolToneGenerator};

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::Result;
use crate::features::FeatureVector;
use crate::params::ToneMapping;

/// Musical note value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum NoteDuration {
    #[serde(rename = "1n")]
    Whole,
    #[serde(rename = "2n")]
    Half,
    #[serde(rename = "4n")]
    Quarter,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "16n")]
    Sixteenth,
}

impl NoteDuration {
    /// Fraction of a whole note
    fn divisor(&self) -> u32 {
        match self {
            NoteDuration::Whole => 1,
            NoteDuration::Half => 2,
            NoteDuration::Quarter => 4,
            NoteDuration::Eighth => 8,
            NoteDuration::Sixteenth => 16,
        }
    }

    /// Length in seconds at `bpm` quarter notes per minute
    pub fn seconds(&self, bpm: f32) -> f32 {
        let quarter = 60.0 / bpm;
        quarter * 4.0 / self.divisor() as f32
    }
}

impl fmt::Display for NoteDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}n", self.divisor())
    }
}

impl FromStr for NoteDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1n" => Ok(NoteDuration::Whole),
            "2n" => Ok(NoteDuration::Half),
            "4n" => Ok(NoteDuration::Quarter),
            "8n" => Ok(NoteDuration::Eighth),
            "16n" => Ok(NoteDuration::Sixteenth),
            other => Err(format!("unknown note value '{}'", other)),
        }
    }
}

/// One voice of a tone trigger
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tone {
    pub frequency_hz: f32,
    pub duration: NoteDuration,
    pub amplitude_db: f32,

    /// Offset from the trigger time
    pub at: Option<Duration>,
}

/// Convert decibels to linear gain
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// One voice per harmonic band
///
/// Voice i plays the (i+1)-th partial of the intensity-derived fundamental
/// at a loudness set by harmonic i. Voices under the floor are dropped.
pub fn tones_for(features: &FeatureVector, mapping: &ToneMapping) -> Vec<Tone> {
    let fundamental = mapping.fundamental(features.intensity);

    features
        .harmonics
        .iter()
        .enumerate()
        .filter_map(|(i, &weight)| {
            let amplitude_db = mapping.amplitude_db(weight);
            if amplitude_db < mapping.floor_db {
                return None;
            }
            let at = (i > 0).then(|| Duration::from_millis(i as u64 * mapping.voice_stagger_ms));
            Some(Tone {
                frequency_hz: fundamental * (i + 1) as f32,
                duration: mapping.note,
                amplitude_db,
                at,
            })
        })
        .collect()
}

/// Anything that can render tones
pub trait ToneSink {
    fn play(&mut self, tones: &[Tone]) -> Result<()>;

    /// Stop all voices
    fn silence(&mut self) -> Result<()>;
}

/// Tone sink that only logs (for `--mute` and headless runs)
#[derive(Debug, Default)]
pub struct SilentToneSink {
    triggers: usize,
}

impl SilentToneSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggers(&self) -> usize {
        self.triggers
    }
}

impl ToneSink for SilentToneSink {
    fn play(&mut self, tones: &[Tone]) -> Result<()> {
        self.triggers += 1;
        tracing::debug!(voices = tones.len(), "tone trigger (muted)");
        Ok(())
    }

    fn silence(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_seconds() {
        assert!((NoteDuration::Quarter.seconds(120.0) - 0.5).abs() < 1e-6);
        assert!((NoteDuration::Eighth.seconds(120.0) - 0.25).abs() < 1e-6);
        assert!((NoteDuration::Whole.seconds(60.0) - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_note_notation() {
        assert_eq!(NoteDuration::Eighth.to_string(), "8n");
        assert_eq!("16n".parse::<NoteDuration>(), Ok(NoteDuration::Sixteenth));
        assert!("3n".parse::<NoteDuration>().is_err());
        assert_eq!(
            serde_json::to_string(&NoteDuration::Quarter).unwrap(),
            "\"4n\""
        );
    }

    #[test]
    fn test_db_to_gain() {
        assert!((db_to_gain(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_gain(-20.0) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_tones_follow_harmonics() {
        let mapping = ToneMapping::default();
        let features = FeatureVector {
            intensity: 0.0,
            harmonics: [1.0, 1.0, 1.0, 1.0, 1.0],
            resonance: 0.5,
        };

        let tones = tones_for(&features, &mapping);
        assert_eq!(tones.len(), 5);
        assert_eq!(tones[0].frequency_hz, 110.0);
        assert_eq!(tones[2].frequency_hz, 330.0);
        assert_eq!(tones[0].at, None);
        assert_eq!(tones[1].at, Some(Duration::from_millis(30)));
        assert!(tones.iter().all(|t| t.amplitude_db == -12.0));
    }

    #[test]
    fn test_quiet_voices_are_dropped() {
        let mapping = ToneMapping::default();
        let features = FeatureVector {
            harmonics: [0.0, 0.9, 0.0, 0.0, 0.0],
            ..FeatureVector::neutral()
        };

        let tones = tones_for(&features, &mapping);
        assert_eq!(tones.len(), 1);
        assert_eq!(tones[0].frequency_hz, mapping.fundamental(0.5) * 2.0);

        assert!(tones_for(&FeatureVector::silent(), &mapping).is_empty());
    }
}
