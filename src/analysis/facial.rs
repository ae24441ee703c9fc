//! Pixel statistics over video frames.
//!
//! The metrics are plain luminance statistics. Symmetry compares mirrored
//! columns (x with width-1-x); the centre column of an odd-width frame has
//! no partner and is excluded. Valence is brightness rescaled to [-1, 1]
//! and says nothing about the subject's mood.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgba, RgbaImage};
use serde::Serialize;
use std::path::Path;

use crate::error::{ExtractionError, Result};
use crate::features::FacialMetrics;
use crate::input::FrameSource;
use crate::params::FacialConfig;

/// Compressed still image captured at the end of a video session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StillFrame {
    pub width: u32,
    pub height: u32,
    pub format: &'static str,

    /// Encoded image bytes (kept in memory only)
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl StillFrame {
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Normalized luminance of one pixel, [0, 1]
pub fn luminance(pixel: &Rgba<u8>) -> f32 {
    let [r, g, b, _] = pixel.0;
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0
}

/// Stateless facial metric extraction
#[derive(Debug, Clone, Default)]
pub struct FacialMetricExtractor {
    config: FacialConfig,
}

impl FacialMetricExtractor {
    pub fn new(config: FacialConfig) -> Self {
        Self { config }
    }

    /// Analyze the source's current frame
    ///
    /// Any failure yields `FacialMetrics::neutral()`.
    pub fn analyze(&self, source: &mut dyn FrameSource) -> FacialMetrics {
        let result = source
            .current_frame()
            .ok_or(ExtractionError::NoFrame)
            .and_then(|frame| self.analyze_frame(&frame));

        result.unwrap_or_else(|e| {
            tracing::debug!("facial extraction fell back to neutral: {}", e);
            FacialMetrics::neutral()
        })
    }

    /// Compute metrics for a single frame
    pub fn analyze_frame(&self, frame: &RgbaImage) -> std::result::Result<FacialMetrics, ExtractionError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(ExtractionError::EmptyFrame { width, height });
        }
        let w = width as usize;
        let h = height as usize;

        let lum: Vec<f32> = frame.pixels().map(luminance).collect();

        let brightness = mean(&lum);
        let contrast = rms_deviation(&lum, brightness) * self.config.contrast_scale as f64;
        let symmetry = 1.0 - mirror_difference(&lum, w, h);

        // Lower part of the frame, at least one row
        let region_rows = ((h as f32 * self.config.expression_region).round() as usize).clamp(1, h);
        let region = &lum[(h - region_rows) * w..];
        let expression = rms_deviation(region, mean(region)) * self.config.expression_scale as f64;

        Ok(FacialMetrics {
            brightness: brightness as f32,
            contrast: contrast as f32,
            symmetry: symmetry as f32,
            expression_intensity: expression as f32,
            emotional_valence: ((brightness - 0.5) * 2.0) as f32,
        }
        .clamped())
    }

    /// Encode the source's current frame as JPEG
    ///
    /// Returns `None` on any failure.
    pub fn capture_still_frame(&self, source: &mut dyn FrameSource) -> Option<StillFrame> {
        let frame = source.current_frame()?;
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let rgb = DynamicImage::ImageRgba8(frame).to_rgb8();
        let mut bytes = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut bytes, self.config.jpeg_quality);
            if let Err(e) = encoder.encode_image(&rgb) {
                tracing::warn!("Failed to encode still frame: {}", e);
                return None;
            }
        }

        Some(StillFrame {
            width,
            height,
            format: "jpeg",
            bytes,
        })
    }
}

fn mean(values: &[f32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

fn rms_deviation(values: &[f32], center: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - center;
            d * d
        })
        .sum();
    (sum_sq / values.len() as f64).sqrt()
}

/// Mean |L(x, y) - L(w-1-x, y)| over the left half
fn mirror_difference(lum: &[f32], w: usize, h: usize) -> f64 {
    let half = w / 2;
    if half == 0 {
        return 0.0;
    }
    let mut total = 0.0f64;
    for row in lum.chunks_exact(w).take(h) {
        for x in 0..half {
            total += (row[x] as f64 - row[w - 1 - x] as f64).abs();
        }
    }
    total / (half * h) as f64
}
