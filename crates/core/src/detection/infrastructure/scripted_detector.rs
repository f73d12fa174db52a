use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::detection::domain::expression_detector::{DetectorError, ExpressionDetector};
use crate::detection::domain::face_detection::FaceDetection;
use crate::shared::frame::Frame;

/// On-disk detection script: one entry per frame, `null` for "no face".
#[derive(Debug, Deserialize)]
pub struct DetectionScript {
    #[serde(default)]
    pub repeat: bool,
    pub frames: Vec<Option<FaceDetection>>,
}

/// Replays pre-computed engine output by frame index.
///
/// Stands in for the expression engine when a recorded session is played
/// back: the same frame always yields the same detection, so mood
/// trajectories are reproducible.
pub struct ScriptedDetector {
    frames: Vec<Option<FaceDetection>>,
    repeat: bool,
    loaded: bool,
}

impl ScriptedDetector {
    pub fn new(frames: Vec<Option<FaceDetection>>, repeat: bool) -> Self {
        Self {
            frames,
            repeat,
            loaded: false,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DetectorError> {
        let script: DetectionScript = serde_json::from_str(json)
            .map_err(|e| DetectorError::Inference(format!("invalid detection script: {e}")))?;
        Ok(Self::new(script.frames, script.repeat))
    }

    pub fn from_file(path: &Path) -> Result<Self, DetectorError> {
        let json = fs::read_to_string(path).map_err(|e| DetectorError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    fn entry(&self, index: usize) -> Option<&FaceDetection> {
        if self.frames.is_empty() {
            return None;
        }
        let slot = if self.repeat {
            index % self.frames.len()
        } else {
            index
        };
        self.frames.get(slot).and_then(|f| f.as_ref())
    }
}

impl ExpressionDetector for ScriptedDetector {
    fn load(&mut self, model_dir: &Path) -> Result<(), DetectorError> {
        log::info!(
            "Replaying {} scripted detections (model directory {} not needed)",
            self.frames.len(),
            model_dir.display()
        );
        self.loaded = true;
        Ok(())
    }

    fn detect(&mut self, frame: &Frame) -> Result<Option<FaceDetection>, DetectorError> {
        if !self.loaded {
            return Err(DetectorError::NotLoaded);
        }
        Ok(self.entry(frame.index()).cloned())
    }
}
