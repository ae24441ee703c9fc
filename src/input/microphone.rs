//! Default input device capture via cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SizedSample};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::AudioInput;
use crate::error::{CaptureError, Result};

/// Microphone stream mixed down to mono into a bounded ring
pub struct MicrophoneInput {
    /// Shared ring written by the capture callback
    buffer: Arc<Mutex<VecDeque<f32>>>,

    /// Input stream (dropping it stops capture)
    stream: Option<cpal::Stream>,

    sample_rate: u32,
}

impl MicrophoneInput {
    /// Open the default input device and start capturing
    ///
    /// A missing device or a stream the host refuses to build is reported
    /// as a permission failure.
    pub fn open(capacity: usize) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| CaptureError::Permission("No audio input device found".to_string()))?;

        let config = device
            .default_input_config()
            .map_err(|e| CaptureError::Permission(format!("Failed to get input config: {}", e)))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            "microphone opened"
        );

        let buffer = Arc::new(Mutex::new(VecDeque::with_capacity(capacity)));

        let stream = match config.sample_format() {
            SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), channels, capacity, &buffer)
            }
            SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), channels, capacity, &buffer)
            }
            SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), channels, capacity, &buffer)
            }
            other => Err(CaptureError::Permission(format!(
                "Unsupported input sample format: {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| CaptureError::Permission(format!("Failed to start input stream: {}", e)))?;

        Ok(Self {
            buffer,
            stream: Some(stream),
            sample_rate,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    capacity: usize,
    buffer: &Arc<Mutex<VecDeque<f32>>>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: cpal::FromSample<T>,
{
    let ring = Arc::clone(buffer);
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let Ok(mut ring) = ring.lock() else {
                    return;
                };
                for frame in data.chunks(channels.max(1)) {
                    // Mono mixdown
                    let sum: f32 = frame
                        .iter()
                        .map(|&s| <f32 as cpal::FromSample<T>>::from_sample_(s))
                        .sum();
                    if ring.len() == capacity {
                        ring.pop_front();
                    }
                    ring.push_back(sum / frame.len() as f32);
                }
            },
            |err| tracing::error!("Audio input stream error: {}", err),
            None,
        )
        .map_err(|e| CaptureError::Permission(format!("Failed to build input stream: {}", e)))
}

impl AudioInput for MicrophoneInput {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn latest_samples(&self, count: usize) -> Vec<f32> {
        match self.buffer.lock() {
            Ok(ring) => {
                let skip = ring.len().saturating_sub(count);
                ring.iter().skip(skip).copied().collect()
            }
            Err(_) => Vec::new(),
        }
    }

    fn release(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::warn!("Failed to pause input stream: {}", e);
            }
            drop(stream);
            tracing::debug!("microphone released");
        }
    }

    fn is_released(&self) -> bool {
        self.stream.is_none()
    }
}

impl Drop for MicrophoneInput {
    fn drop(&mut self) {
        self.release();
    }
}
