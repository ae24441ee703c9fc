//! Soulprint - capture a voice, a face or the room and turn it into
//! rings of colour and a chord.
//!
//! Each session samples features on the display cadence, sounds them every
//! few hundred milliseconds and ends with an immutable Soul Print.

mod cli;

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

use cli::Args;
use soulprint::capture::CaptureOrchestrator;
use soulprint::gallery::{Gallery, ProfileSummary};
use soulprint::tone::{GlicolToneGenerator, SilentToneSink, ToneSink};
use soulprint::visualization::{render_ascii, visualize, PhaseCounter};
use soulprint::SoulPrint;

/// Interval between meter redraws
const STATUS_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("soulprint=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> soulprint::Result<()> {
    let settings = args.settings();
    settings.validate()?;
    let session_len = args.session_length()?;

    let tones: Box<dyn ToneSink> = if args.mute {
        Box::new(SilentToneSink::new())
    } else {
        match GlicolToneGenerator::new(settings.tone.clone(), settings.cadence.sound_interval()) {
            Ok(generator) => Box::new(generator),
            Err(e) => {
                tracing::warn!("Tone output unavailable, continuing muted: {}", e);
                Box::new(SilentToneSink::new())
            }
        }
    };

    let devices = Box::new(args.devices(&settings));
    let mut capture = CaptureOrchestrator::new(settings.clone(), devices, tones);
    let mut gallery = Gallery::new();

    let frame_interval = Duration::from_millis(settings.analyzer.frame_interval_ms);

    for session in 0..args.sessions {
        let started = Instant::now();
        capture.start(args.mode, started)?;

        let mut phase = PhaseCounter::new();
        let mut last = started;
        let mut last_status = started;

        while started.elapsed() < session_len {
            let now = Instant::now();
            let features = capture.tick(now);
            phase.advance(now - last, settings.visual.phase_rate);
            last = now;

            if !args.quiet && now - last_status >= STATUS_INTERVAL {
                let rings = visualize(&features, phase.phase(), &settings.visual);
                print!(
                    "\r{} intensity {:.2} resonance {:.2}",
                    render_ascii(&rings, 3),
                    features.intensity,
                    features.resonance
                );
                let _ = std::io::stdout().flush();
                last_status = now;
            }

            thread::sleep(frame_interval);
        }
        if !args.quiet {
            println!();
        }

        if let Some(print) = capture.stop(Instant::now()) {
            if let (Some(frame), Some(path)) = (print.still_frame(), args.frame_path(session)) {
                frame.save(&path)?;
                tracing::info!(path = %path.display(), "still frame saved");
            }
            report(&print, args.json)?;
            gallery.add(print);
        }
    }

    let summary = ProfileSummary::from_gallery(&gallery);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Profile: {} print(s), avg intensity {:.2}, avg resonance {:.2}",
            summary.total, summary.average_intensity, summary.average_resonance
        );
    }

    Ok(())
}

fn report(print: &SoulPrint, json: bool) -> soulprint::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(print)?);
        return Ok(());
    }

    let visual = print.visual();
    let audio = print.audio();
    let rhythm: Vec<String> = audio.rhythm_pattern.iter().map(|n| n.to_string()).collect();

    println!("Soul Print {} ({})", print.short_id(), print.mode());
    println!(
        "  visual: hue {:.0}°, saturation {:.0}%, complexity {:.2}",
        visual.hue, visual.saturation, visual.complexity
    );
    println!(
        "  audio:  base {:.1} Hz, depth {:.2}, rhythm {}",
        audio.base_frequency,
        audio.resonance_depth,
        rhythm.join(" ")
    );
    if let Some(frame) = print.still_frame() {
        println!("  frame:  {}x{} {}", frame.width, frame.height, frame.format);
    }
    Ok(())
}
