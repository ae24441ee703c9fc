//! Feature → visualization parameter mapping.

use crate::error::ConfigError;

/// Mapping from feature values to ring shape parameters
#[derive(Debug, Clone)]
pub struct VisualMapping {
    /// Radius of the innermost ring (normalized canvas units)
    pub base_radius: f32,

    /// Radius added per ring index
    pub ring_spacing: f32,

    /// Scale factor: harmonic energy → radius swell
    /// Formula: radius = base + index * spacing + harmonic * this_scale
    pub harmonic_to_radius_scale: f32,

    /// Rotation speed multiplier (radians per unit phase)
    pub rotation_speed: f32,

    /// Hue offset between adjacent rings (degrees)
    pub hue_spread_deg: f32,

    /// Scale factor: intensity → stroke width
    pub intensity_to_stroke_scale: f32,

    /// Phase advance per second (radians)
    pub phase_rate: f32,
}

impl Default for VisualMapping {
    fn default() -> Self {
        Self {
            base_radius: 0.15,
            ring_spacing: 0.12,
            harmonic_to_radius_scale: 0.08,
            rotation_speed: 1.0,
            hue_spread_deg: 24.0,
            intensity_to_stroke_scale: 0.03,
            phase_rate: std::f32::consts::PI / 2.0,
        }
    }
}

impl VisualMapping {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_radius <= 0.0 || self.ring_spacing < 0.0 {
            return Err(ConfigError::Invalid(
                "ring radius and spacing must be positive".to_string(),
            ));
        }
        if self.phase_rate < 0.0 {
            return Err(ConfigError::Invalid(
                "phase rate must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}
