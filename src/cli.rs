//! Command-line argument parsing.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

use soulprint::error::ConfigError;
use soulprint::features::CaptureMode;
use soulprint::input::SystemDevices;
use soulprint::params::Settings;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "soulprint")]
#[command(about = "Capture a Soul Print from voice, face frames or ambient synthesis", long_about = None)]
pub struct Args {
    /// Capture mode: audio, video or ambient
    #[arg(long, value_name = "MODE", default_value = "ambient")]
    pub mode: CaptureMode,

    /// Length of each capture session (seconds)
    #[arg(long, value_name = "SECONDS", default_value = "5")]
    pub duration: f32,

    /// Number of consecutive capture sessions
    #[arg(long, value_name = "N", default_value = "1")]
    pub sessions: usize,

    /// Replay a WAV file instead of opening the microphone
    #[arg(long, value_name = "PATH")]
    pub wav: Option<PathBuf>,

    /// Directory of image frames used as the camera in video mode
    #[arg(long, value_name = "DIR")]
    pub frames: Option<PathBuf>,

    /// Frame rate of the replayed image directory
    #[arg(long, value_name = "FPS", default_value = "10")]
    pub fps: f32,

    /// Do not open an audio output device
    #[arg(long)]
    pub mute: bool,

    /// Write the captured still frame (video mode) to this path
    #[arg(long, value_name = "PATH")]
    pub save_frame: Option<PathBuf>,

    /// Print Soul Prints and the profile as JSON
    #[arg(long)]
    pub json: bool,

    /// Hide the live visualization meter
    #[arg(long)]
    pub quiet: bool,

    /// Tone trigger interval (milliseconds)
    #[arg(long, value_name = "MS", default_value = "800")]
    pub sound_interval_ms: u64,

    /// FFT window size for audio analysis (power of 2)
    #[arg(long, value_name = "SAMPLES", default_value = "256")]
    pub fft_size: usize,
}

impl Args {
    /// Default settings with command-line overrides applied
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::default();
        settings.cadence.sound_interval_ms = self.sound_interval_ms;
        settings.analyzer.fft_size = self.fft_size;
        settings
    }

    /// Length of one capture session; negative values mean zero
    pub fn session_length(&self) -> Result<Duration, ConfigError> {
        Duration::try_from_secs_f32(self.duration.max(0.0)).map_err(|e| {
            ConfigError::Invalid(format!("duration {} s is out of range: {}", self.duration, e))
        })
    }

    /// Device access for the binary
    pub fn devices(&self, settings: &Settings) -> SystemDevices {
        SystemDevices {
            wav: self.wav.clone(),
            frames_dir: self.frames.clone(),
            fps: self.fps,
            // One second of audio at 48 kHz is plenty for any window size
            buffer_len: settings.analyzer.fft_size.max(48_000),
        }
    }

    /// Still-frame output path for a session (numbered when capturing several)
    pub fn frame_path(&self, session: usize) -> Option<PathBuf> {
        let path = self.save_frame.as_ref()?;
        if self.sessions <= 1 {
            return Some(path.clone());
        }
        Some(numbered(path, session + 1))
    }
}

fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}-{}", stem, n),
    };
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["soulprint"]);
        assert_eq!(args.mode, CaptureMode::Ambient);
        assert_eq!(args.sessions, 1);
        assert!(args.settings().validate().is_ok());
    }

    #[test]
    fn test_overrides_reach_settings() {
        let args = Args::parse_from([
            "soulprint",
            "--mode",
            "voice",
            "--sound-interval-ms",
            "400",
            "--fft-size",
            "512",
        ]);
        assert_eq!(args.mode, CaptureMode::Audio);
        let settings = args.settings();
        assert_eq!(settings.cadence.sound_interval_ms, 400);
        assert_eq!(settings.analyzer.bin_count(), 256);
    }

    #[test]
    fn test_session_length() {
        let args = Args::parse_from(["soulprint", "--duration", "2.5"]);
        assert_eq!(args.session_length(), Ok(Duration::from_millis(2500)));

        let args = Args::parse_from(["soulprint", "--duration=-3"]);
        assert_eq!(args.session_length(), Ok(Duration::ZERO));

        let args = Args::parse_from(["soulprint", "--duration", "inf"]);
        assert!(matches!(args.session_length(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_frame_paths_are_numbered_for_many_sessions() {
        let single = Args::parse_from(["soulprint", "--save-frame", "out/face.jpg"]);
        assert_eq!(single.frame_path(0), Some(PathBuf::from("out/face.jpg")));

        let many = Args::parse_from(["soulprint", "--save-frame", "out/face.jpg", "--sessions", "3"]);
        assert_eq!(many.frame_path(1), Some(PathBuf::from("out/face-2.jpg")));
        assert_eq!(Args::parse_from(["soulprint"]).frame_path(0), None);
    }
}
