use crate::rendering::domain::drawing_surface::DrawingSurface;
use crate::shared::frame::FrameMetadata;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeOutcome {
    Resized { width: u32, height: u32 },
    Unchanged,
    MissingSurface,
}

/// Matches both surfaces to the frame's native size.
///
/// Runs every frame; surfaces ignore same-size requests. Skipped entirely
/// while either surface is missing.
pub fn sync_canvas_size(
    canvas: Option<&mut dyn DrawingSurface>,
    overlay: Option<&mut dyn DrawingSurface>,
    frame: &FrameMetadata,
) -> SizeOutcome {
    let (Some(canvas), Some(overlay)) = (canvas, overlay) else {
        return SizeOutcome::MissingSurface;
    };

    let target = (frame.width, frame.height);
    let changed = canvas.size() != target || overlay.size() != target;

    canvas.set_size(frame.width, frame.height);
    overlay.set_size(frame.width, frame.height);

    if changed {
        SizeOutcome::Resized {
            width: frame.width,
            height: frame.height,
        }
    } else {
        SizeOutcome::Unchanged
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::detection::domain::face_detection::FaceLandmarks;
    use crate::mood::domain::mood_style::MoodStyle;
    use crate::shared::frame::Frame;
    use std::time::Duration;

    /// Surface that records what was done to it.
    #[derive(Default)]
    pub(crate) struct RecordingSurface {
        pub(crate) size: (u32, u32),
        pub(crate) resizes: usize,
        pub(crate) clears: usize,
        pub(crate) images: usize,
        pub(crate) landmark_draws: Vec<FaceLandmarks>,
        pub(crate) styles: Vec<MoodStyle>,
    }

    impl DrawingSurface for RecordingSurface {
        fn size(&self) -> (u32, u32) {
            self.size
        }

        fn set_size(&mut self, width: u32, height: u32) {
            if self.size != (width, height) {
                self.size = (width, height);
                self.resizes += 1;
            }
        }

        fn clear(&mut self) {
            self.clears += 1;
        }

        fn draw_image(&mut self, _frame: &Frame) {
            self.images += 1;
        }

        fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) {
            self.landmark_draws.push(landmarks.clone());
        }

        fn set_style(&mut self, style: &MoodStyle) {
            self.styles.push(style.clone());
        }
    }

    fn meta(width: u32, height: u32) -> FrameMetadata {
        FrameMetadata {
            width,
            height,
            index: 0,
            presented_at: Duration::ZERO,
        }
    }

    #[test]
    fn test_tracks_most_recent_frame_size() {
        let mut canvas = RecordingSurface::default();
        let mut overlay = RecordingSurface::default();

        let first = sync_canvas_size(Some(&mut canvas), Some(&mut overlay), &meta(640, 480));
        assert_eq!(first, SizeOutcome::Resized { width: 640, height: 480 });
        assert_eq!(canvas.size(), (640, 480));
        assert_eq!(overlay.size(), (640, 480));

        let second = sync_canvas_size(Some(&mut canvas), Some(&mut overlay), &meta(1280, 720));
        assert_eq!(second, SizeOutcome::Resized { width: 1280, height: 720 });
        assert_eq!(canvas.size(), (1280, 720));
        assert_eq!(overlay.size(), (1280, 720));
    }

    #[test]
    fn test_same_size_is_unchanged() {
        let mut canvas = RecordingSurface::default();
        let mut overlay = RecordingSurface::default();
        sync_canvas_size(Some(&mut canvas), Some(&mut overlay), &meta(640, 480));

        let outcome = sync_canvas_size(Some(&mut canvas), Some(&mut overlay), &meta(640, 480));

        assert_eq!(outcome, SizeOutcome::Unchanged);
        assert_eq!(canvas.resizes, 1);
        assert_eq!(overlay.resizes, 1);
    }

    #[test]
    fn test_missing_surface_skips_both() {
        let mut canvas = RecordingSurface::default();
        let outcome = sync_canvas_size(Some(&mut canvas), None, &meta(640, 480));

        assert_eq!(outcome, SizeOutcome::MissingSurface);
        assert_eq!(canvas.size(), (0, 0));
    }
}
