//! Glicol-backed tone generator.
//!
//! Each trigger rewrites the Glicol composition: one gated sine voice per
//! tone, mixed into a shared low-pass filter and plate reverb.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use glicol::Engine;
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{db_to_gain, Tone, ToneSink};
use crate::error::{CaptureError, Result};
use crate::params::audio_constants::{BLOCK_SIZE, OUTPUT_LIMIT};
use crate::params::ToneMapping;

/// Composition with no audible output
const SILENCE: &str = "o: sin 0 >> mul 0\n";

/// Build the Glicol composition for one trigger
///
/// Gates retrigger at `retrigger_hz` so the voices repeat until the next
/// trigger replaces them.
pub fn compose(tones: &[Tone], mapping: &ToneMapping, retrigger_hz: f32) -> String {
    if tones.is_empty() {
        return SILENCE.to_string();
    }

    let mut code = String::new();

    for (i, tone) in tones.iter().enumerate() {
        let gain = db_to_gain(tone.amplitude_db);
        let decay_s = tone.duration.seconds(mapping.tempo_bpm);
        let _ = writeln!(
            code,
            "~g{i}: imp {retrigger_hz:.3} >> envperc 0.005 {decay_s:.3}"
        );
        let _ = write!(
            code,
            "~v{i}: sin {:.2} >> mul ~g{i} >> mul {gain:.4}",
            tone.frequency_hz
        );
        match tone.at.map(|d| d.as_millis()) {
            Some(ms) if ms > 0 => {
                let _ = writeln!(code, " >> delayms {ms}");
            }
            _ => code.push('\n'),
        }
    }

    let voices: Vec<String> = (0..tones.len()).map(|i| format!("~v{i}")).collect();
    let _ = writeln!(
        code,
        "o: mix {} >> lpf {:.1} 1.0 >> plate {:.2}",
        voices.join(" "),
        mapping.filter_cutoff_hz,
        mapping.reverb_mix
    );
    code
}

/// Tone generator rendering through the default output device
pub struct GlicolToneGenerator {
    /// Engine shared with the output callback
    engine: Arc<Mutex<Engine<BLOCK_SIZE>>>,

    mapping: ToneMapping,

    retrigger_hz: f32,

    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl GlicolToneGenerator {
    /// Open the default output device and start a silent engine
    ///
    /// `retrigger` is the spacing of successive triggers (the sound loop
    /// period).
    pub fn new(mapping: ToneMapping, retrigger: Duration) -> Result<Self> {
        mapping.validate()?;

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| CaptureError::Output("No audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| CaptureError::Output(format!("Failed to get audio config: {}", e)))?;

        if config.sample_format() != cpal::SampleFormat::F32 {
            return Err(CaptureError::Output(format!(
                "Unsupported output sample format: {:?}",
                config.sample_format()
            )));
        }

        let sample_rate = config.sample_rate().0;
        let channels = config.channels().max(1) as usize;

        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            "tone output opened"
        );

        // Create Glicol engine
        let mut engine = Engine::<BLOCK_SIZE>::new();
        engine.set_sr(sample_rate as usize);
        engine.update_with_code(SILENCE);
        engine
            .update()
            .map_err(|e| CaptureError::Output(format!("Glicol engine init failed: {:?}", e)))?;

        let engine = Arc::new(Mutex::new(engine));
        let engine_clone = Arc::clone(&engine);

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let Ok(mut engine) = engine_clone.lock() else {
                        data.fill(0.0);
                        return;
                    };

                    let frames_needed = data.len() / channels;
                    let mut frame_idx = 0;

                    // Generate multiple blocks if needed to fill the entire buffer
                    while frame_idx < frames_needed {
                        let (buffers, _) = engine.next_block(vec![]);

                        let samples_to_copy = (frames_needed - frame_idx).min(BLOCK_SIZE);

                        for i in 0..samples_to_copy {
                            // Safety limiter
                            let left = buffers[0][i].clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);
                            let right = buffers[1][i].clamp(-OUTPUT_LIMIT, OUTPUT_LIMIT);

                            let out_idx = (frame_idx + i) * channels;
                            for (c, sample) in data[out_idx..out_idx + channels].iter_mut().enumerate() {
                                *sample = if c % 2 == 0 { left } else { right };
                            }
                        }

                        frame_idx += samples_to_copy;
                    }
                },
                |err| tracing::error!("Audio output stream error: {}", err),
                None,
            )
            .map_err(|e| CaptureError::Output(format!("Failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| CaptureError::Output(format!("Failed to start audio stream: {}", e)))?;

        let retrigger_hz = 1.0 / retrigger.as_secs_f32().max(0.001);

        Ok(Self {
            engine,
            mapping,
            retrigger_hz,
            _stream: stream,
        })
    }

    fn load(&self, code: &str) -> Result<()> {
        let mut engine = self
            .engine
            .lock()
            .map_err(|_| CaptureError::Output("synthesis engine lock poisoned".to_string()))?;
        engine.update_with_code(code);
        engine
            .update()
            .map_err(|e| CaptureError::Output(format!("Glicol update failed: {:?}", e)))
    }
}

impl ToneSink for GlicolToneGenerator {
    fn play(&mut self, tones: &[Tone]) -> Result<()> {
        let code = compose(tones, &self.mapping, self.retrigger_hz);
        tracing::trace!(%code, "glicol composition");
        self.load(&code)
    }

    fn silence(&mut self) -> Result<()> {
        self.load(SILENCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::NoteDuration;

    fn tone(frequency_hz: f32, at_ms: Option<u64>) -> Tone {
        Tone {
            frequency_hz,
            duration: NoteDuration::Eighth,
            amplitude_db: -20.0,
            at: at_ms.map(Duration::from_millis),
        }
    }

    #[test]
    fn test_empty_trigger_is_silent() {
        let code = compose(&[], &ToneMapping::default(), 1.25);
        assert_eq!(code, SILENCE);
    }

    #[test]
    fn test_one_voice_per_tone_through_shared_chain() {
        let mapping = ToneMapping::default();
        let code = compose(&[tone(220.0, None), tone(440.0, Some(30))], &mapping, 1.25);

        assert!(code.contains("~v0: sin 220.00 >> mul ~g0 >> mul 0.1000\n"));
        assert!(code.contains("~v1: sin 440.00 >> mul ~g1 >> mul 0.1000 >> delayms 30\n"));
        assert!(code.contains("~g0: imp 1.250 >> envperc 0.005 0.250"));
        assert!(code.contains("o: mix ~v0 ~v1 >> lpf 2000.0 1.0 >> plate 0.20"));
        assert_eq!(code.matches("plate").count(), 1);
    }

    #[test]
    fn test_each_voice_decays_over_its_own_note() {
        let mapping = ToneMapping::default();
        let mut long = tone(110.0, None);
        long.duration = NoteDuration::Quarter;
        let mut short = tone(220.0, Some(30));
        short.duration = NoteDuration::Sixteenth;

        let code = compose(&[long, short], &mapping, 1.25);
        assert!(code.contains("~g0: imp 1.250 >> envperc 0.005 0.500\n"));
        assert!(code.contains("~g1: imp 1.250 >> envperc 0.005 0.125\n"));
    }
}
