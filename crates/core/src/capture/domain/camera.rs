use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("no camera available: {0}")]
    NoDevice(String),
    #[error("unsupported capture request: {0}")]
    Unsupported(String),
    #[error("stream error: {0}")]
    Stream(String),
}

impl CaptureError {
    /// Whether asking again could succeed (the user may grant access or
    /// plug in a device). A malformed request will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CaptureError::Unsupported(_))
    }
}

/// Which tracks to ask the platform for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureRequest {
    pub video: bool,
    pub audio: bool,
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self {
            video: true,
            audio: false,
        }
    }
}

/// Domain interface for the platform media-capture subsystem.
pub trait Camera: Send {
    fn request_access(
        &mut self,
        request: CaptureRequest,
    ) -> Result<Box<dyn MediaStream>, CaptureError>;
}

/// A live stream of frames handed out by a [`Camera`].
pub trait MediaStream: Send {
    /// Blocks until the next frame is ready. `None` once the stream has ended.
    fn next_frame(&mut self) -> Option<Result<Frame, CaptureError>>;

    fn has_audio(&self) -> bool {
        false
    }

    /// Releases the device. Further calls to `next_frame` return `None`.
    fn stop(&mut self);
}
