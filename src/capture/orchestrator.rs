//! Capture session state machine.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::time::{Duration, Instant};

use super::ambient::ambient_features;
use crate::analysis::{FacialMetricExtractor, FrequencyAnalyzer};
use crate::error::{CaptureError, Result};
use crate::features::{CaptureMode, FeatureVector};
use crate::input::{DeviceProvider, FrameSource};
use crate::params::Settings;
use crate::record::SoulPrint;
use crate::schedule::RepeatingTimer;
use crate::tone::{tones_for, ToneSink};

/// Observable orchestrator state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Capturing(CaptureMode),
}

/// Mode-specific producer of feature vectors
enum Feed {
    Audio {
        analyzer: FrequencyAnalyzer,
        features: Receiver<FeatureVector>,
    },
    Video {
        source: Box<dyn FrameSource>,
        poll: RepeatingTimer,
    },
    Ambient {
        tick: RepeatingTimer,
    },
}

struct ActiveSession {
    mode: CaptureMode,
    started: Instant,
    feed: Feed,
    sound: RepeatingTimer,
    latest: FeatureVector,
    samples: u64,
}

/// Owns the capture session: device streams, both loops and the latest
/// feature vector.
///
/// The host calls `tick` once per display frame. Only one session can be
/// active at a time.
pub struct CaptureOrchestrator {
    settings: Settings,
    devices: Box<dyn DeviceProvider>,
    tones: Box<dyn ToneSink>,
    extractor: FacialMetricExtractor,
    session: Option<ActiveSession>,
    subscribers: Vec<Sender<FeatureVector>>,
}

impl CaptureOrchestrator {
    pub fn new(
        settings: Settings,
        devices: Box<dyn DeviceProvider>,
        tones: Box<dyn ToneSink>,
    ) -> Self {
        let extractor = FacialMetricExtractor::new(settings.facial.clone());
        Self {
            settings,
            devices,
            tones,
            extractor,
            session: None,
            subscribers: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> CaptureState {
        match &self.session {
            Some(session) => CaptureState::Capturing(session.mode),
            None => CaptureState::Idle,
        }
    }

    pub fn is_capturing(&self) -> bool {
        self.session.is_some()
    }

    /// Latest feature vector of the active session (neutral when idle)
    pub fn latest(&self) -> FeatureVector {
        self.session
            .as_ref()
            .map(|s| s.latest)
            .unwrap_or_else(FeatureVector::neutral)
    }

    /// Register an observer for every vector produced from now on
    ///
    /// All observers are disconnected when the current (or next) session
    /// stops.
    pub fn subscribe(&mut self) -> Receiver<FeatureVector> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Acquire the mode's input and start both loops
    ///
    /// Fails without changing state if a session is already active or the
    /// device cannot be acquired. Partially acquired devices are released
    /// before the error is returned.
    pub fn start(&mut self, mode: CaptureMode, now: Instant) -> Result<()> {
        if let Some(active) = &self.session {
            tracing::warn!(active = %active.mode, requested = %mode, "start while capturing");
            return Err(CaptureError::AlreadyCapturing);
        }
        self.settings.validate()?;

        let feed = match mode {
            CaptureMode::Audio => {
                let input = self.devices.acquire_microphone()?;
                let mut analyzer = FrequencyAnalyzer::new(self.settings.analyzer.clone());
                analyzer.initialize(input)?;
                let (tx, rx) = unbounded();
                analyzer.start_analysis(tx, now)?;
                Feed::Audio {
                    analyzer,
                    features: rx,
                }
            }
            CaptureMode::Video => {
                let source = self.devices.acquire_camera()?;
                let mut poll = RepeatingTimer::new(self.settings.cadence.video_poll());
                poll.start_immediate(now);
                Feed::Video { source, poll }
            }
            CaptureMode::Ambient => {
                let mut tick = RepeatingTimer::new(self.settings.cadence.ambient_tick());
                tick.start_immediate(now);
                Feed::Ambient { tick }
            }
        };

        let mut sound = RepeatingTimer::new(self.settings.cadence.sound_interval());
        sound.start(now);

        self.session = Some(ActiveSession {
            mode,
            started: now,
            feed,
            sound,
            latest: FeatureVector::neutral(),
            samples: 0,
        });

        tracing::info!(%mode, "capture started");
        Ok(())
    }

    /// Run whatever loop iterations are due and return the latest vector
    pub fn tick(&mut self, now: Instant) -> FeatureVector {
        let Some(session) = self.session.as_mut() else {
            return FeatureVector::neutral();
        };

        let mut produced = Vec::new();
        match &mut session.feed {
            Feed::Audio { analyzer, features } => {
                analyzer.tick(now);
                produced.extend(features.try_iter());
            }
            Feed::Video { source, poll } => {
                if poll.poll(now) {
                    let metrics = self.extractor.analyze(source.as_mut());
                    produced.push(metrics.to_feature_vector());
                }
            }
            Feed::Ambient { tick } => {
                if tick.poll(now) {
                    let elapsed = now.saturating_duration_since(session.started);
                    produced.push(ambient_features(elapsed.as_secs_f32()));
                }
            }
        }

        for features in produced {
            session.latest = features;
            session.samples += 1;
            self.subscribers.retain(|tx| tx.send(features).is_ok());
        }

        if session.sound.poll(now) {
            let tones = tones_for(&session.latest, &self.settings.tone);
            tracing::debug!(voices = tones.len(), "sound trigger");
            if let Err(e) = self.tones.play(&tones) {
                tracing::warn!("Tone trigger failed: {}", e);
            }
        }

        session.latest
    }

    /// End the session and return its Soul Print
    ///
    /// Returns `None` when idle. Teardown never fails: release problems are
    /// logged and the state always returns to `Idle`.
    pub fn stop(&mut self, now: Instant) -> Option<SoulPrint> {
        let ActiveSession {
            mode,
            started,
            feed,
            mut sound,
            latest,
            samples,
        } = self.session.take()?;

        sound.cancel();

        let still_frame = match feed {
            Feed::Audio {
                mut analyzer,
                features,
            } => {
                analyzer.stop_analysis();
                analyzer.cleanup();
                drop(features);
                None
            }
            Feed::Video {
                mut source,
                mut poll,
            } => {
                poll.cancel();
                let still = self.extractor.capture_still_frame(source.as_mut());
                if still.is_none() {
                    tracing::warn!("No still frame captured");
                }
                source.release();
                still
            }
            Feed::Ambient { mut tick } => {
                tick.cancel();
                None
            }
        };

        self.subscribers.clear();

        if let Err(e) = self.tones.silence() {
            tracing::warn!("Failed to silence tone generator: {}", e);
        }

        let duration: Duration = now.saturating_duration_since(started);
        let print = SoulPrint::from_features(mode, latest, still_frame, duration, &self.settings.tone);

        tracing::info!(
            %mode,
            id = %print.id(),
            samples,
            seconds = duration.as_secs_f32(),
            "capture stopped"
        );
        Some(print)
    }
}

impl Drop for CaptureOrchestrator {
    fn drop(&mut self) {
        if self.session.is_some() {
            tracing::debug!("orchestrator dropped while capturing; releasing devices");
            let _ = self.stop(Instant::now());
        }
    }
}
