//! Single-flight gate in front of the expression engine.
//!
//! At most one detection is outstanding. Frames presented while it runs are
//! dropped, not queued, so a slow engine never falls further behind live video.

use std::time::Duration;

use crate::capture::domain::video_sink::VideoSink;
use crate::detection::domain::async_detector::{AsyncDetector, DetectionOutcome, Generation};
use crate::detection::domain::face_detection::FaceDetection;

/// Why `detect_faces` did not start a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectSkip {
    ModelsLoading,
    NoSource,
    SourceInactive,
    InFlight(Generation),
    BackendUnavailable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectDecision {
    Started(Generation),
    Skipped(DetectSkip),
}

/// The most recent completed detection.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredDetection {
    pub generation: Generation,
    pub frame_index: usize,
    /// `None` when the engine found no face in that frame.
    pub face: Option<FaceDetection>,
}

/// A completion observed by [`DetectorGate::poll_completion`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub generation: Generation,
    /// False when the engine failed and the previous result was kept.
    pub stored: bool,
    pub latency: Duration,
}

pub struct DetectorGate {
    backend: Box<dyn AsyncDetector>,
    in_flight: Option<Generation>,
    next_generation: Generation,
    latest: Option<StoredDetection>,
    failures: usize,
}

impl DetectorGate {
    pub fn new(backend: Box<dyn AsyncDetector>) -> Self {
        Self {
            backend,
            in_flight: None,
            next_generation: 1,
            latest: None,
            failures: 0,
        }
    }

    pub fn in_flight(&self) -> Option<Generation> {
        self.in_flight
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn latest(&self) -> Option<&StoredDetection> {
        self.latest.as_ref()
    }

    pub fn latest_face(&self) -> Option<&FaceDetection> {
        self.latest.as_ref().and_then(|s| s.face.as_ref())
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn models_loaded(&self) -> bool {
        self.backend.models_loaded()
    }

    /// Starts a detection on the sink's current frame unless something
    /// makes that pointless or a previous one is still running.
    pub fn detect_faces(&mut self, sink: Option<&VideoSink>) -> DetectDecision {
        if !self.backend.models_loaded() {
            return DetectDecision::Skipped(DetectSkip::ModelsLoading);
        }
        let Some(sink) = sink else {
            return DetectDecision::Skipped(DetectSkip::NoSource);
        };
        if sink.is_paused() || sink.is_ended() {
            return DetectDecision::Skipped(DetectSkip::SourceInactive);
        }
        if let Some(generation) = self.in_flight {
            return DetectDecision::Skipped(DetectSkip::InFlight(generation));
        }
        let Some(frame) = sink.current_frame() else {
            return DetectDecision::Skipped(DetectSkip::NoSource);
        };

        let generation = self.next_generation;
        match self.backend.start(generation, frame.clone()) {
            Ok(()) => {
                self.next_generation += 1;
                self.in_flight = Some(generation);
                DetectDecision::Started(generation)
            }
            Err(e) => {
                log::warn!("Could not start detection: {e}");
                DetectDecision::Skipped(DetectSkip::BackendUnavailable)
            }
        }
    }

    /// Collects a finished detection, if any, storing it and clearing the
    /// in-flight flag.
    pub fn poll_completion(&mut self) -> Option<Completion> {
        let DetectionOutcome {
            generation,
            frame_index,
            result,
            latency,
        } = loop {
            let outcome = self.backend.poll()?;
            if self.in_flight == Some(outcome.generation) {
                break outcome;
            }
            log::debug!(
                "Discarding stale detection {} (in flight: {:?})",
                outcome.generation,
                self.in_flight
            );
        };
        self.in_flight = None;

        let stored = match result {
            Ok(face) => {
                self.latest = Some(StoredDetection {
                    generation,
                    frame_index,
                    face,
                });
                true
            }
            Err(e) => {
                self.failures += 1;
                log::warn!("Detection {generation} on frame {frame_index} failed: {e}");
                false
            }
        };

        Some(Completion {
            generation,
            stored,
            latency,
        })
    }
}
