//! In-memory list of Soul Prints produced during this run.

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::features::CaptureMode;
use crate::record::SoulPrint;

/// Session-lifetime collection; nothing is written to disk
#[derive(Debug, Default)]
pub struct Gallery {
    prints: Vec<SoulPrint>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, print: SoulPrint) {
        tracing::debug!(id = %print.id(), mode = %print.mode(), "soul print added to gallery");
        self.prints.push(print);
    }

    pub fn len(&self) -> usize {
        self.prints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prints.is_empty()
    }

    /// Most recently added
    pub fn latest(&self) -> Option<&SoulPrint> {
        self.prints.last()
    }

    pub fn get(&self, id: Uuid) -> Option<&SoulPrint> {
        self.prints.iter().find(|p| p.id() == id)
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &SoulPrint> {
        self.prints.iter().rev()
    }

    /// Newest first, one mode only
    pub fn by_mode(&self, mode: CaptureMode) -> impl Iterator<Item = &SoulPrint> {
        self.iter().filter(move |p| p.mode() == mode)
    }
}

/// Aggregate view over a gallery
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProfileSummary {
    pub total: usize,
    pub per_mode: BTreeMap<String, usize>,
    pub average_intensity: f32,
    pub average_resonance: f32,

    /// Hue of the print with the highest intensity
    pub dominant_hue: Option<f32>,
}

impl ProfileSummary {
    pub fn from_gallery(gallery: &Gallery) -> Self {
        let total = gallery.len();

        let mut per_mode = BTreeMap::new();
        for mode in CaptureMode::ALL {
            per_mode.insert(mode.to_string(), gallery.by_mode(mode).count());
        }

        let (intensity_sum, resonance_sum) = gallery.iter().fold((0.0, 0.0), |(i, r), p| {
            (i + p.features().intensity, r + p.features().resonance)
        });
        let average = |sum: f32| if total == 0 { 0.0 } else { sum / total as f32 };

        let dominant_hue = gallery
            .iter()
            .max_by(|a, b| a.features().intensity.total_cmp(&b.features().intensity))
            .map(|p| p.visual().hue);

        Self {
            total,
            per_mode,
            average_intensity: average(intensity_sum),
            average_resonance: average(resonance_sum),
            dominant_hue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::params::ToneMapping;
    use std::time::Duration;

    fn print(mode: CaptureMode, intensity: f32, resonance: f32) -> SoulPrint {
        SoulPrint::from_features(
            mode,
            FeatureVector {
                intensity,
                resonance,
                ..FeatureVector::neutral()
            },
            None,
            Duration::from_secs(2),
            &ToneMapping::default(),
        )
    }

    #[test]
    fn test_newest_first() {
        let mut gallery = Gallery::new();
        let first = print(CaptureMode::Audio, 0.1, 0.1);
        let second = print(CaptureMode::Video, 0.2, 0.2);
        let (first_id, second_id) = (first.id(), second.id());
        gallery.add(first);
        gallery.add(second);

        let ids: Vec<_> = gallery.iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec![second_id, first_id]);
        assert_eq!(gallery.latest().map(|p| p.id()), Some(second_id));
        assert!(gallery.get(first_id).is_some());
        assert!(gallery.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_empty_profile() {
        let summary = ProfileSummary::from_gallery(&Gallery::new());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_intensity, 0.0);
        assert_eq!(summary.dominant_hue, None);
        assert_eq!(summary.per_mode["audio"], 0);
    }

    #[test]
    fn test_profile_aggregates() {
        let mut gallery = Gallery::new();
        gallery.add(print(CaptureMode::Audio, 0.2, 0.5));
        gallery.add(print(CaptureMode::Audio, 0.8, 0.25));
        gallery.add(print(CaptureMode::Ambient, 0.5, 0.75));

        let summary = ProfileSummary::from_gallery(&gallery);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.per_mode["audio"], 2);
        assert_eq!(summary.per_mode["video"], 0);
        assert_eq!(summary.per_mode["ambient"], 1);
        assert!((summary.average_intensity - 0.5).abs() < 1e-6);
        assert!((summary.average_resonance - 0.5).abs() < 1e-6);
        // Most intense print has resonance 0.25 → hue 90
        assert_eq!(summary.dominant_hue, Some(90.0));
    }
}
