use std::ops::ControlFlow;

use crate::capture::domain::camera::CaptureError;
use crate::capture::domain::video_sink::VideoSink;
use crate::pipeline::mood_filter_controller::MoodFilterController;
use crate::shared::constants::MAX_CONSECUTIVE_STREAM_ERRORS;
use crate::shared::frame::FrameMetadata;

/// Receives each presented frame. Returning `Continue` re-registers for the
/// next one; `Break` ends the pump.
pub trait FrameCallback {
    fn frame_ready(&mut self, sink: &VideoSink, frame: &FrameMetadata) -> ControlFlow<()>;
}

impl FrameCallback for MoodFilterController {
    fn frame_ready(&mut self, sink: &VideoSink, frame: &FrameMetadata) -> ControlFlow<()> {
        self.on_frame(sink, frame);
        ControlFlow::Continue(())
    }
}

/// Why the pump returned, with the number of frames delivered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PumpExit {
    StreamEnded { frames: usize },
    Stopped { frames: usize },
    FrameLimit { frames: usize },
    /// The sink was paused or empty, so no frame could be presented.
    NotPlaying { frames: usize },
}

impl PumpExit {
    pub fn frames(&self) -> usize {
        match *self {
            PumpExit::StreamEnded { frames }
            | PumpExit::Stopped { frames }
            | PumpExit::FrameLimit { frames }
            | PumpExit::NotPlaying { frames } => frames,
        }
    }
}

/// Drives the frame callback chain: present a frame, fire the callback,
/// repeat. Callbacks never overlap because the loop is sequential.
#[derive(Clone, Copy, Debug, Default)]
pub struct FramePump {
    max_frames: Option<usize>,
}

impl FramePump {
    pub fn new(max_frames: Option<usize>) -> Self {
        Self { max_frames }
    }

    pub fn max_frames(&self) -> Option<usize> {
        self.max_frames
    }

    /// Unreadable frames are skipped; the pump fails only after
    /// [`MAX_CONSECUTIVE_STREAM_ERRORS`] in a row.
    pub fn run(
        &self,
        sink: &mut VideoSink,
        callback: &mut dyn FrameCallback,
    ) -> Result<PumpExit, CaptureError> {
        let mut frames = 0;
        let mut consecutive_errors = 0;

        loop {
            if self.max_frames.is_some_and(|max| frames >= max) {
                sink.pause();
                return Ok(PumpExit::FrameLimit { frames });
            }

            let meta = match sink.present_next() {
                Some(Ok(meta)) => meta,
                Some(Err(e)) => {
                    consecutive_errors += 1;
                    if consecutive_errors >= MAX_CONSECUTIVE_STREAM_ERRORS {
                        log::error!("Giving up after {consecutive_errors} stream errors: {e}");
                        return Err(e);
                    }
                    log::warn!("Skipping unreadable frame: {e}");
                    continue;
                }
                None if sink.is_ended() => return Ok(PumpExit::StreamEnded { frames }),
                None => return Ok(PumpExit::NotPlaying { frames }),
            };
            consecutive_errors = 0;
            frames += 1;

            if callback.frame_ready(sink, &meta).is_break() {
                return Ok(PumpExit::Stopped { frames });
            }
        }
    }
}
