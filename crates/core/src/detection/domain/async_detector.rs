use std::time::Duration;

use crate::detection::domain::expression_detector::DetectorError;
use crate::detection::domain::face_detection::FaceDetection;
use crate::shared::frame::Frame;

/// Monotonic id of a detection request.
pub type Generation = u64;

/// A finished detection, handed back to the frame thread.
#[derive(Debug)]
pub struct DetectionOutcome {
    pub generation: Generation,
    pub frame_index: usize,
    pub result: Result<Option<FaceDetection>, DetectorError>,
    pub latency: Duration,
}

/// Port for running an [`ExpressionDetector`](super::expression_detector::ExpressionDetector)
/// without blocking the frame callback.
///
/// `start` hands over a frame; the outcome shows up in a later `poll`.
/// Callers keep at most one request outstanding.
pub trait AsyncDetector: Send {
    fn models_loaded(&self) -> bool;

    fn start(&mut self, generation: Generation, frame: Frame) -> Result<(), DetectorError>;

    fn poll(&mut self) -> Option<DetectionOutcome>;
}
