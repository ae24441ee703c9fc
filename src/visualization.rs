//! Procedural ring visualization driven by feature vectors.
//!
//! `visualize` is a pure function of the features and a repeating phase;
//! the only state lives in `PhaseCounter`.

use glam::Vec2;
use std::f32::consts::TAU;
use std::time::Duration;

use crate::features::FeatureVector;
use crate::params::VisualMapping;

const METER_LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Repeating animation phase in [0, 2π)
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseCounter {
    phase: f32,
}

impl PhaseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Advance by `dt` at `rate` radians per second
    pub fn advance(&mut self, dt: Duration, rate: f32) -> f32 {
        self.phase = (self.phase + dt.as_secs_f32() * rate).rem_euclid(TAU);
        self.phase
    }
}

/// One animated ring (normalized canvas coordinates, origin at centre)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingShape {
    pub center: Vec2,
    pub radius: f32,

    /// Radians
    pub rotation: f32,

    /// [0.3, 1]
    pub opacity: f32,

    /// Degrees, [0, 360)
    pub hue: f32,

    pub stroke_width: f32,

    /// Petal count of the outline
    pub lobes: u32,

    /// Petal depth as a fraction of the radius
    pub deformation: f32,
}

impl RingShape {
    /// Sample the deformed outline at `segments` points
    pub fn outline(&self, segments: usize) -> Vec<Vec2> {
        (0..segments)
            .map(|k| {
                let theta = k as f32 / segments as f32 * TAU;
                let r = self.radius
                    * (1.0 + self.deformation * (self.lobes as f32 * theta + self.rotation).sin());
                self.center + Vec2::from_angle(theta) * r
            })
            .collect()
    }
}

/// Map features at a given phase to ring shapes, innermost first
pub fn visualize(features: &FeatureVector, phase: f32, mapping: &VisualMapping) -> Vec<RingShape> {
    let f = features.clamped();

    f.harmonics
        .iter()
        .enumerate()
        .map(|(i, &h)| {
            let index = i as f32;
            let pulse = 1.0 + 0.1 * (phase + index).sin();
            let direction = if i % 2 == 0 { 1.0 } else { -1.0 };
            let drift = Vec2::from_angle(phase + index) * 0.02 * f.intensity;

            RingShape {
                center: drift,
                radius: mapping.base_radius
                    + index * mapping.ring_spacing
                    + h * mapping.harmonic_to_radius_scale * pulse,
                rotation: direction * phase * mapping.rotation_speed * (1.0 + f.resonance),
                opacity: 0.3 + 0.7 * h,
                hue: (f.resonance * 360.0 + index * mapping.hue_spread_deg).rem_euclid(360.0),
                stroke_width: 0.005 + f.intensity * mapping.intensity_to_stroke_scale,
                lobes: 3 + i as u32,
                deformation: 0.15 * h,
            }
        })
        .collect()
}

/// One-line terminal meter: `cells` characters per ring
pub fn render_ascii(rings: &[RingShape], cells: usize) -> String {
    let mut line = String::with_capacity(rings.len() * cells * 3 + 2);
    line.push('[');
    for ring in rings {
        let level = ((ring.opacity - 0.3) / 0.7).clamp(0.0, 1.0);
        let idx = (level * (METER_LEVELS.len() - 1) as f32).round() as usize;
        for _ in 0..cells {
            line.push(METER_LEVELS[idx]);
        }
    }
    line.push(']');
    line
}
