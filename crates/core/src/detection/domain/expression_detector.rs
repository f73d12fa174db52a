use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::detection::domain::face_detection::FaceDetection;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("detection models are not loaded")]
    NotLoaded,
    #[error("failed to load models from {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("a detection is already in flight")]
    Busy,
    #[error("detector worker has stopped")]
    WorkerGone,
}

/// Domain interface for the external face/landmark/expression engine.
///
/// Returns at most one face per frame. Implementations may keep state
/// between calls, hence `&mut self`.
pub trait ExpressionDetector: Send {
    /// Completes once every model the engine needs is resident.
    fn load(&mut self, model_dir: &Path) -> Result<(), DetectorError>;

    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceDetection>, DetectorError>;
}
