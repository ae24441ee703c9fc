//! Synthetic feature generator for ambient sessions.

use crate::features::{FeatureVector, HARMONIC_BANDS};

/// Closed-form features as a function of seconds since the session started
pub fn ambient_features(elapsed_s: f32) -> FeatureVector {
    let t = elapsed_s;
    let mut harmonics = [0.0; HARMONIC_BANDS];
    for (i, h) in harmonics.iter_mut().enumerate() {
        let i = i as f32;
        *h = 0.5 + 0.4 * (t * (0.3 + 0.17 * i) + 1.3 * i).sin();
    }

    FeatureVector {
        intensity: 0.5 + 0.3 * (0.7 * t).sin(),
        harmonics,
        resonance: 0.5 + 0.4 * (0.23 * t).cos(),
    }
    .clamped()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starting_values() {
        let v = ambient_features(0.0);
        assert_eq!(v.intensity, 0.5);
        assert_eq!(v.harmonics[0], 0.5);
        assert!((v.resonance - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_always_normalized_and_moving() {
        let mut previous = ambient_features(0.0);
        for step in 1..400 {
            let v = ambient_features(step as f32 * 0.15);
            assert!(v.is_normalized());
            assert_ne!(v, previous);
            previous = v;
        }
    }
}
