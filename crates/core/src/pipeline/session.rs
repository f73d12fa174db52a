use std::ops::ControlFlow;

use crate::capture::domain::camera::{Camera, CaptureError, CaptureRequest};
use crate::capture::domain::video_sink::VideoSink;
use crate::pipeline::frame_pump::{FrameCallback, FramePump, PumpExit};
use crate::pipeline::mood_filter_controller::{FrameReport, MoodFilterController};
use crate::shared::frame::FrameMetadata;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    /// Camera acquisition or the stream failed. Retry with
    /// [`MoodCamSession::retry`] when the error allows it.
    Failed(CaptureError),
    Finished,
}

/// Glues a camera to the controller: acquire, play, pump frames.
pub struct MoodCamSession {
    camera: Box<dyn Camera>,
    request: CaptureRequest,
    sink: VideoSink,
    controller: MoodFilterController,
    pump: FramePump,
    state: SessionState,
}

impl MoodCamSession {
    pub fn new(
        camera: Box<dyn Camera>,
        request: CaptureRequest,
        controller: MoodFilterController,
        pump: FramePump,
    ) -> Self {
        Self {
            camera,
            request,
            sink: VideoSink::new(),
            controller,
            pump,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn sink(&self) -> &VideoSink {
        &self.sink
    }

    pub fn controller(&self) -> &MoodFilterController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MoodFilterController {
        &mut self.controller
    }

    /// Requests camera access and starts playback. On failure the session
    /// enters [`SessionState::Failed`] and no frames are pumped.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.state == SessionState::Running {
            return Ok(());
        }
        let stream = match self.camera.request_access(self.request) {
            Ok(stream) => stream,
            Err(e) => {
                log::warn!("Camera unavailable: {e}");
                self.state = SessionState::Failed(e.clone());
                return Err(e);
            }
        };
        if self.request.audio && !stream.has_audio() {
            log::info!("Stream has no audio track");
        }

        self.sink.attach(stream);
        if let Err(e) = self.sink.play() {
            self.sink.detach();
            self.state = SessionState::Failed(e.clone());
            return Err(e);
        }
        log::info!("Camera stream started");
        self.state = SessionState::Running;
        Ok(())
    }

    /// Re-issues the access request after a retryable failure.
    pub fn retry(&mut self) -> Result<(), CaptureError> {
        if let SessionState::Failed(e) = &self.state {
            if !e.is_retryable() {
                return Err(e.clone());
            }
            log::info!("Retrying camera access");
        }
        self.start()
    }

    pub fn run(&mut self) -> Result<PumpExit, CaptureError> {
        self.run_with(&mut |_, _| ControlFlow::Continue(()))
    }

    /// Pumps frames through the controller, handing each report to
    /// `observer`, which may stop the session early.
    pub fn run_with(
        &mut self,
        observer: &mut dyn FnMut(&FrameReport, &MoodFilterController) -> ControlFlow<()>,
    ) -> Result<PumpExit, CaptureError> {
        if self.state != SessionState::Running {
            return Err(CaptureError::Stream(format!(
                "session is not running ({:?})",
                self.state
            )));
        }

        let mut callback = Observed {
            controller: &mut self.controller,
            observer,
        };
        let result = self.pump.run(&mut self.sink, &mut callback);
        self.sink.detach();

        match &result {
            Ok(exit) => {
                log::info!("Session finished after {} frames", exit.frames());
                self.state = SessionState::Finished;
            }
            Err(e) => {
                log::error!("Session stopped: {e}");
                self.state = SessionState::Failed(e.clone());
            }
        }
        result
    }
}

struct Observed<'a> {
    controller: &'a mut MoodFilterController,
    observer: &'a mut dyn FnMut(&FrameReport, &MoodFilterController) -> ControlFlow<()>,
}

impl FrameCallback for Observed<'_> {
    fn frame_ready(&mut self, sink: &VideoSink, frame: &FrameMetadata) -> ControlFlow<()> {
        let report = self.controller.on_frame(sink, frame);
        (self.observer)(&report, &*self.controller)
    }
}
