use crate::detection::domain::async_detector::Generation;
use crate::detection::domain::detector_gate::{DetectorGate, StoredDetection};
use crate::rendering::domain::drawing_surface::DrawingSurface;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Drawn,
    /// Latest result had no face or no landmarks; the canvas was cleared.
    NoLandmarks,
    /// Waiting for the detection with this generation to complete.
    Awaiting(Generation),
    SkippedNoSurface,
    SkippedInFlight(Generation),
}

/// Draws the latest landmarks, one render at a time.
///
/// When a detection is still running the renderer parks on its generation
/// and draws from [`resolve`](Self::resolve) once that detection lands,
/// so it never paints a result older than the one it waited for.
#[derive(Debug, Default)]
pub struct LandmarkRenderer {
    awaiting: Option<Generation>,
}

impl LandmarkRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_in_flight(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn awaiting(&self) -> Option<Generation> {
        self.awaiting
    }

    pub fn add_landmarks(
        &mut self,
        surface: Option<&mut dyn DrawingSurface>,
        gate: &DetectorGate,
    ) -> RenderOutcome {
        let Some(surface) = surface else {
            return RenderOutcome::SkippedNoSurface;
        };
        if let Some(generation) = self.awaiting {
            return RenderOutcome::SkippedInFlight(generation);
        }
        if let Some(generation) = gate.in_flight() {
            self.awaiting = Some(generation);
            return RenderOutcome::Awaiting(generation);
        }
        draw(surface, gate.latest())
    }

    /// Finishes a parked render once detection `completed` is done.
    ///
    /// Returns `None` when nothing was parked or the completion predates the
    /// awaited generation. The flag clears whenever a render is attempted,
    /// even if the surface disappeared meanwhile.
    pub fn resolve(
        &mut self,
        surface: Option<&mut dyn DrawingSurface>,
        completed: Generation,
        latest: Option<&StoredDetection>,
    ) -> Option<RenderOutcome> {
        let awaited = self.awaiting?;
        if completed < awaited {
            return None;
        }
        self.awaiting = None;
        Some(match surface {
            Some(surface) => draw(surface, latest),
            None => RenderOutcome::SkippedNoSurface,
        })
    }
}

fn draw(surface: &mut dyn DrawingSurface, latest: Option<&StoredDetection>) -> RenderOutcome {
    surface.clear();
    let (width, height) = surface.size();
    let landmarks = latest
        .and_then(|stored| stored.face.as_ref())
        .and_then(|face| face.landmarks_for(width, height));

    match landmarks {
        Some(points) => {
            surface.draw_landmarks(&points);
            RenderOutcome::Drawn
        }
        None => RenderOutcome::NoLandmarks,
    }
}
