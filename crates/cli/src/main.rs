use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::Parser;

use moodcam_core::capture::infrastructure::image_sequence_camera::ImageSequenceCamera;
use moodcam_core::detection::domain::async_detector::AsyncDetector;
use moodcam_core::detection::domain::detector_gate::DetectorGate;
use moodcam_core::detection::infrastructure::inline_detector::InlineDetector;
use moodcam_core::detection::infrastructure::scripted_detector::ScriptedDetector;
use moodcam_core::detection::infrastructure::threaded_detector::ThreadedDetector;
use moodcam_core::mood::domain::mood_style::StyleMode;
use moodcam_core::pipeline::frame_pump::FramePump;
use moodcam_core::pipeline::mood_filter_controller::MoodFilterController;
use moodcam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use moodcam_core::pipeline::session::MoodCamSession;
use moodcam_core::rendering::infrastructure::raster_surface::{composite, RasterSurface};
use moodcam_core::rendering::infrastructure::snapshot_writer::{SnapshotError, SnapshotWriter};
use moodcam_core::shared::constants::DEFAULT_MODEL_DIR;
use moodcam_core::shared::frame::Frame;
use moodcam_core::shared::model_resolver;
use moodcam_core::shared::settings::Settings;

const MODEL_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Drive a mood filter from camera frames and facial expressions.
#[derive(Parser)]
#[command(name = "moodcam")]
struct Cli {
    /// Directory of frames to play as the camera.
    frames: PathBuf,

    /// Detection script (JSON) standing in for the expression engine.
    #[arg(long)]
    script: PathBuf,

    /// Write composited PNG snapshots to this directory.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Keep every Nth frame when writing snapshots.
    #[arg(long, default_value = "1")]
    snapshot_every: usize,

    /// Frame rate of the image sequence (overrides settings).
    #[arg(long)]
    fps: Option<f64>,

    /// Sleep between frames to hold real-time cadence.
    #[arg(long)]
    pace: bool,

    /// Restart the sequence when it ends.
    #[arg(long = "loop")]
    looped: bool,

    /// Stop after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Settings file (default: per-user config directory).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Model directory (overrides settings).
    #[arg(long)]
    models: Option<PathBuf>,

    /// Ask the camera for an audio track as well.
    #[arg(long)]
    audio: bool,

    /// Run detection on the frame thread instead of a worker.
    #[arg(long)]
    inline: bool,

    /// Style mode: hue-rotate, overlay or both.
    #[arg(long)]
    style: Option<String>,

    /// Mood change per happy frame.
    #[arg(long)]
    step: Option<i32>,

    /// Starting mood (default: top of the range).
    #[arg(long)]
    initial_mood: Option<i32>,

    /// Persist the effective settings before running.
    #[arg(long)]
    save_settings: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let settings = load_settings(&cli)?;
    let model_dir = resolve_models(cli.models.as_deref().or(settings.model_dir.as_deref()))?;
    let backend = build_backend(&cli, model_dir)?;

    let total_frames = cli.max_frames;
    let controller = MoodFilterController::new(
        DetectorGate::new(backend),
        settings.build_mood()?,
        settings.style,
    )
    .with_surfaces(Box::new(RasterSurface::new()), Box::new(RasterSurface::new()))
    .with_logger(Box::new(StdoutPipelineLogger::default()))
    .with_total_frames(total_frames);

    let camera = ImageSequenceCamera::new(&cli.frames, settings.fps)
        .looped(cli.looped)
        .paced(cli.pace);
    let mut session = MoodCamSession::new(
        Box::new(camera),
        settings.capture_request(),
        controller,
        FramePump::new(total_frames),
    );
    session.start()?;

    let mut writer = cli
        .output
        .as_ref()
        .map(|dir| SnapshotWriter::new(dir, cli.snapshot_every));
    let mut snapshot_error: Option<SnapshotError> = None;

    let exit = session.run_with(&mut |report, controller| {
        log::debug!(
            "Frame {}: mood {} ({})",
            report.frame_index,
            report.mood,
            report.style.to_css()
        );
        let Some(writer) = writer.as_mut() else {
            return ControlFlow::Continue(());
        };
        let Some(frame) = snapshot(controller) else {
            return ControlFlow::Continue(());
        };
        match writer.write(&frame) {
            Ok(_) => ControlFlow::Continue(()),
            Err(e) => {
                snapshot_error = Some(e);
                ControlFlow::Break(())
            }
        }
    })?;

    if let Some(e) = snapshot_error {
        return Err(e.into());
    }

    let controller = session.controller();
    controller.logger().summary();
    log::info!(
        "Processed {} frames, final mood {} ({})",
        exit.frames(),
        controller.mood().value(),
        controller.style().to_css()
    );
    if let Some(writer) = writer {
        log::info!(
            "Wrote {} snapshots to {}",
            writer.written(),
            writer.dir().display()
        );
    }
    Ok(())
}

fn load_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load(),
    };
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }
    if let Some(step) = cli.step {
        settings.mood_step = step;
    }
    if let Some(initial) = cli.initial_mood {
        settings.initial_mood = Some(initial);
    }
    if let Some(style) = &cli.style {
        settings.style = parse_style(style)?;
    }
    if cli.audio {
        settings.request_audio = true;
    }
    settings.validate()?;

    if cli.save_settings {
        let path = match &cli.settings {
            Some(path) => path.clone(),
            None => Settings::config_path().ok_or("could not determine config directory")?,
        };
        settings.save_to(&path)?;
        log::info!("Saved settings to {}", path.display());
    }
    Ok(settings)
}

/// An explicit directory must be complete. Otherwise a missing model set
/// only warrants a warning, since scripted detections need no weights.
fn resolve_models(explicit: Option<&Path>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    if explicit.is_some() {
        return Ok(model_resolver::resolve(explicit, None)?);
    }
    match model_resolver::resolve(None, Some(Path::new(DEFAULT_MODEL_DIR))) {
        Ok(dir) => {
            log::info!("Using models from {}", dir.display());
            Ok(dir)
        }
        Err(e) => {
            log::warn!("{e}; falling back to {DEFAULT_MODEL_DIR}");
            Ok(PathBuf::from(DEFAULT_MODEL_DIR))
        }
    }
}

fn build_backend(
    cli: &Cli,
    model_dir: PathBuf,
) -> Result<Box<dyn AsyncDetector>, Box<dyn std::error::Error>> {
    let detector = Box::new(ScriptedDetector::from_file(&cli.script)?);

    if cli.inline {
        let mut inline = InlineDetector::new(detector);
        inline.load(&model_dir)?;
        Ok(Box::new(inline))
    } else {
        let threaded = ThreadedDetector::spawn(detector, model_dir);
        threaded.wait_until_loaded(MODEL_LOAD_TIMEOUT)?;
        Ok(Box::new(threaded))
    }
}

/// Styled video with the landmark canvas laid on top.
fn snapshot(controller: &MoodFilterController) -> Option<Frame> {
    let video = controller.overlay()?.export()?;
    match controller.canvas().and_then(|canvas| canvas.export()) {
        Some(landmarks) => composite(&video, &landmarks).or(Some(video)),
        None => Some(video),
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.frames.is_dir() {
        return Err(format!("Frames directory not found: {}", cli.frames.display()).into());
    }
    if !cli.script.is_file() {
        return Err(format!("Detection script not found: {}", cli.script.display()).into());
    }
    if cli.snapshot_every == 0 {
        return Err("--snapshot-every must be at least 1".into());
    }
    if let Some(fps) = cli.fps {
        if !(fps.is_finite() && fps > 0.0) {
            return Err(format!("Frame rate must be positive, got {fps}").into());
        }
    }
    if cli.max_frames == Some(0) {
        return Err("--max-frames must be at least 1".into());
    }
    if let Some(step) = cli.step {
        if step <= 0 {
            return Err(format!("Step must be positive, got {step}").into());
        }
    }
    if let Some(style) = &cli.style {
        parse_style(style)?;
    }
    Ok(())
}

fn parse_style(style: &str) -> Result<StyleMode, String> {
    StyleMode::ALL
        .iter()
        .copied()
        .find(|mode| mode.to_string() == style)
        .ok_or_else(|| {
            let names: Vec<String> = StyleMode::ALL.iter().map(|m| m.to_string()).collect();
            format!(
                "Style must be one of: {}, got '{style}'",
                names.join(", ")
            )
        })
}
