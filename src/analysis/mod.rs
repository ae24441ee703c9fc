//! Feature extraction from audio spectra and video frames.
//!
//! Both analyzers produce values normalized to [0, 1] and never surface
//! per-tick failures: a failed extraction yields the neutral fallback.

mod facial;
mod frequency;
mod spectrum;

// Re-export public types
pub use facial::{luminance, FacialMetricExtractor, StillFrame};
pub use frequency::{extract_features, FrequencyAnalyzer};
pub use spectrum::{blackman_window, SpectrumAnalyser};
