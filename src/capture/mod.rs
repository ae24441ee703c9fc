//! Capture sessions: device acquisition, sampling loops and Soul Print
//! assembly.

mod ambient;
mod orchestrator;

// Re-export public types
pub use ambient::ambient_features;
pub use orchestrator::{CaptureOrchestrator, CaptureState};
