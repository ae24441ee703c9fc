//! Image-backed frame sources standing in for a camera.

use image::RgbaImage;
use std::path::Path;
use std::time::Instant;

use super::FrameSource;
use crate::error::{CaptureError, Result};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];

/// Directory of still images cycled at a fixed frame rate
pub struct ImageSequenceSource {
    frames: Vec<RgbaImage>,
    fps: f32,
    started: Instant,
    released: bool,
}

impl ImageSequenceSource {
    /// Load every image in `dir`, sorted by file name
    ///
    /// A missing or empty directory is reported as a permission failure.
    pub fn open(dir: &Path, fps: f32) -> Result<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            CaptureError::Permission(format!("Cannot open frame source {}: {}", dir.display(), e))
        })?;

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        let mut frames = Vec::with_capacity(paths.len());
        for path in &paths {
            match image::open(path) {
                Ok(img) => frames.push(img.to_rgba8()),
                Err(e) => tracing::warn!(path = %path.display(), "Skipping unreadable frame: {}", e),
            }
        }

        if frames.is_empty() {
            return Err(CaptureError::Permission(format!(
                "No readable frames in {}",
                dir.display()
            )));
        }

        tracing::info!(dir = %dir.display(), frames = frames.len(), fps, "frame source opened");
        Ok(Self::from_frames(frames, fps))
    }

    pub fn from_frames(frames: Vec<RgbaImage>, fps: f32) -> Self {
        Self {
            frames,
            fps: if fps > 0.0 { fps } else { 1.0 },
            started: Instant::now(),
            released: false,
        }
    }

    /// Index of the frame shown `elapsed_s` seconds after opening
    pub fn frame_index_at(&self, elapsed_s: f32) -> usize {
        if self.frames.is_empty() {
            return 0;
        }
        (elapsed_s.max(0.0) * self.fps) as usize % self.frames.len()
    }
}

impl FrameSource for ImageSequenceSource {
    fn current_frame(&mut self) -> Option<RgbaImage> {
        if self.released {
            return None;
        }
        let index = self.frame_index_at(self.started.elapsed().as_secs_f32());
        self.frames.get(index).cloned()
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.frames.clear();
            tracing::debug!("frame source released");
        }
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

/// A single fixed frame
pub struct StillImageSource {
    frame: Option<RgbaImage>,
    released: bool,
}

impl StillImageSource {
    pub fn new(frame: RgbaImage) -> Self {
        Self {
            frame: Some(frame),
            released: false,
        }
    }

    /// Source that never yields a frame
    pub fn empty() -> Self {
        Self {
            frame: None,
            released: false,
        }
    }
}

impl FrameSource for StillImageSource {
    fn current_frame(&mut self) -> Option<RgbaImage> {
        if self.released {
            return None;
        }
        self.frame.clone()
    }

    fn release(&mut self) {
        self.released = true;
        self.frame = None;
    }

    fn is_released(&self) -> bool {
        self.released
    }
}
