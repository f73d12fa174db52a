use std::time::{Duration, Instant};

use crate::capture::domain::video_sink::VideoSink;
use crate::detection::domain::detector_gate::{Completion, DetectDecision, DetectorGate};
use crate::mood::domain::mood::{Mood, MoodTransition};
use crate::mood::domain::mood_style::{MoodStyle, StyleMode};
use crate::pipeline::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use crate::rendering::domain::canvas_sizer::{sync_canvas_size, SizeOutcome};
use crate::rendering::domain::drawing_surface::DrawingSurface;
use crate::rendering::domain::landmark_renderer::{LandmarkRenderer, RenderOutcome};
use crate::shared::frame::FrameMetadata;

/// Everything one frame callback did, for logging and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub frame_index: usize,
    pub size: SizeOutcome,
    pub completion: Option<Completion>,
    /// A parked render that the completion released.
    pub resolved: Option<RenderOutcome>,
    pub detect: DetectDecision,
    pub render: RenderOutcome,
    /// `None` when no face was available to drive the mood.
    pub transition: Option<MoodTransition>,
    pub mood: i32,
    pub style: MoodStyle,
    pub elapsed: Duration,
}

/// Owns all per-session mutable state and runs the per-frame chain:
/// size sync, detection, landmarks, mood, style.
///
/// Only the frame callback touches it, so plain fields suffice.
pub struct MoodFilterController {
    gate: DetectorGate,
    renderer: LandmarkRenderer,
    mood: Mood,
    initial_mood: i32,
    style_mode: StyleMode,
    canvas: Option<Box<dyn DrawingSurface>>,
    overlay: Option<Box<dyn DrawingSurface>>,
    logger: Box<dyn PipelineLogger>,
    total_frames: Option<usize>,
    detection_ready: bool,
}

impl MoodFilterController {
    pub fn new(gate: DetectorGate, mood: Mood, style_mode: StyleMode) -> Self {
        Self {
            gate,
            renderer: LandmarkRenderer::new(),
            initial_mood: mood.value(),
            mood,
            style_mode,
            canvas: None,
            overlay: None,
            logger: Box::new(NullPipelineLogger),
            total_frames: None,
            detection_ready: false,
        }
    }

    pub fn with_surfaces(
        mut self,
        canvas: Box<dyn DrawingSurface>,
        overlay: Box<dyn DrawingSurface>,
    ) -> Self {
        self.canvas = Some(canvas);
        self.overlay = Some(overlay);
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Lets progress report a percentage when the session length is known.
    pub fn with_total_frames(mut self, total: Option<usize>) -> Self {
        self.total_frames = total;
        self
    }

    pub fn set_canvas(&mut self, canvas: Option<Box<dyn DrawingSurface>>) {
        self.canvas = canvas;
    }

    pub fn set_overlay(&mut self, overlay: Option<Box<dyn DrawingSurface>>) {
        self.overlay = overlay;
    }

    pub fn canvas(&self) -> Option<&dyn DrawingSurface> {
        match &self.canvas {
            Some(surface) => Some(surface.as_ref()),
            None => None,
        }
    }

    pub fn overlay(&self) -> Option<&dyn DrawingSurface> {
        match &self.overlay {
            Some(surface) => Some(surface.as_ref()),
            None => None,
        }
    }

    pub fn gate(&self) -> &DetectorGate {
        &self.gate
    }

    pub fn renderer(&self) -> &LandmarkRenderer {
        &self.renderer
    }

    pub fn mood(&self) -> &Mood {
        &self.mood
    }

    pub fn style_mode(&self) -> StyleMode {
        self.style_mode
    }

    pub fn style(&self) -> MoodStyle {
        MoodStyle::for_mood(&self.mood, self.style_mode)
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    /// Back to the value the controller was created with.
    pub fn reset_mood(&mut self) {
        self.mood.reset(self.initial_mood);
    }

    /// Runs one frame callback.
    pub fn on_frame(&mut self, sink: &VideoSink, frame: &FrameMetadata) -> FrameReport {
        let started = Instant::now();
        self.logger.progress(frame.index, self.total_frames);

        let size = sync_canvas_size(surface(&mut self.canvas), surface(&mut self.overlay), frame);
        if let SizeOutcome::Resized { width, height } = size {
            log::debug!("Surfaces resized to {width}x{height}");
        }

        let completion = self.gate.poll_completion();
        let resolved = match completion {
            Some(done) => {
                self.logger
                    .timing("detect", done.latency.as_secs_f64() * 1000.0);
                self.renderer.resolve(
                    surface(&mut self.canvas),
                    done.generation,
                    self.gate.latest(),
                )
            }
            None => None,
        };

        let detect = self.gate.detect_faces(Some(sink));
        if !self.detection_ready && self.gate.models_loaded() {
            self.detection_ready = true;
            self.logger
                .info(&format!("Expression models ready at frame {}", frame.index));
        }
        let render = self
            .renderer
            .add_landmarks(surface(&mut self.canvas), &self.gate);

        let transition = self.apply_mood();
        let style = self.style();

        if let Some(overlay) = self.overlay.as_mut() {
            if let Some(current) = sink.current_frame() {
                overlay.draw_image(current);
            }
            overlay.set_style(&style);
        }

        self.logger.metric("mood", self.mood.value() as f64);
        let elapsed = started.elapsed();
        self.logger.timing("frame", elapsed.as_secs_f64() * 1000.0);

        FrameReport {
            frame_index: frame.index,
            size,
            completion,
            resolved,
            detect,
            render,
            transition,
            mood: self.mood.value(),
            style,
            elapsed,
        }
    }

    fn apply_mood(&mut self) -> Option<MoodTransition> {
        let expression = self.gate.latest_face()?.top_expression()?;
        let transition = self.mood.apply(&expression);
        match transition {
            MoodTransition::Raised { from, to } | MoodTransition::Lowered { from, to } => {
                log::debug!("Mood {from} -> {to} ({expression})");
            }
            MoodTransition::Reset { from } => {
                self.logger
                    .info(&format!("Mood reset from {from} ({expression})"));
            }
            MoodTransition::Saturated(_) | MoodTransition::Ignored(_) => {}
        }
        Some(transition)
    }
}

fn surface(slot: &mut Option<Box<dyn DrawingSurface>>) -> Option<&mut dyn DrawingSurface> {
    match slot {
        Some(s) => Some(s.as_mut()),
        None => None,
    }
}
