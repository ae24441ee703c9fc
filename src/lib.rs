//! Soulprint library - biometric-style feature capture with audio-reactive
//! visuals and tones

pub mod analysis;
pub mod capture;
pub mod error;
pub mod features;
pub mod gallery;
pub mod input;
pub mod params;
pub mod record;
pub mod schedule;
pub mod tone;
pub mod visualization;

pub use error::{CaptureError, Result};
pub use record::SoulPrint;
