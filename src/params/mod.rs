//! Parameter definitions with physical units and documented semantics.
//!
//! All tuning constants live here with:
//! - Physical units (Hz, milliseconds, decibels, pixels)
//! - Documented ranges and meanings
//! - A `validate()` pass run before any device is opened

mod analysis;
mod capture;
mod tone;
mod visual;

// Re-export all types
pub use analysis::{AnalyzerConfig, FacialConfig};
pub use capture::CaptureCadence;
pub use tone::{audio_constants, ToneMapping};
pub use visual::VisualMapping;

use crate::error::ConfigError;

/// Complete runtime configuration
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub analyzer: AnalyzerConfig,
    pub facial: FacialConfig,
    pub cadence: CaptureCadence,
    pub tone: ToneMapping,
    pub visual: VisualMapping,
}

impl Settings {
    /// Validate every section
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyzer.validate()?;
        self.facial.validate()?;
        self.cadence.validate()?;
        self.tone.validate()?;
        self.visual.validate()?;
        Ok(())
    }
}
