use std::path::Path;
use std::time::Instant;

use crate::detection::domain::async_detector::{AsyncDetector, DetectionOutcome, Generation};
use crate::detection::domain::expression_detector::{DetectorError, ExpressionDetector};
use crate::shared::frame::Frame;

/// Runs detection synchronously inside `start` and hands the outcome back on
/// the next `poll`.
///
/// Gives a deterministic one-frame detection latency, which keeps replays
/// and tests reproducible.
pub struct InlineDetector {
    detector: Box<dyn ExpressionDetector>,
    loaded: bool,
    pending: Option<DetectionOutcome>,
}

impl InlineDetector {
    pub fn new(detector: Box<dyn ExpressionDetector>) -> Self {
        Self {
            detector,
            loaded: false,
            pending: None,
        }
    }

    pub fn load(&mut self, model_dir: &Path) -> Result<(), DetectorError> {
        self.detector.load(model_dir)?;
        self.loaded = true;
        Ok(())
    }
}

impl AsyncDetector for InlineDetector {
    fn models_loaded(&self) -> bool {
        self.loaded
    }

    fn start(&mut self, generation: Generation, frame: Frame) -> Result<(), DetectorError> {
        if !self.loaded {
            return Err(DetectorError::NotLoaded);
        }
        if self.pending.is_some() {
            return Err(DetectorError::Busy);
        }
        let started = Instant::now();
        let result = self.detector.detect(&frame);
        self.pending = Some(DetectionOutcome {
            generation,
            frame_index: frame.index(),
            result,
            latency: started.elapsed(),
        });
        Ok(())
    }

    fn poll(&mut self) -> Option<DetectionOutcome> {
        self.pending.take()
    }
}
