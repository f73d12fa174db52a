use crate::detection::domain::face_detection::FaceLandmarks;
use crate::mood::domain::mood_style::MoodStyle;
use crate::shared::frame::Frame;

/// Domain interface for a 2D raster drawing target.
///
/// Resizing to a different size discards the current contents, matching
/// how platform canvases behave.
pub trait DrawingSurface {
    fn size(&self) -> (u32, u32);

    /// No-op when the size is unchanged.
    fn set_size(&mut self, width: u32, height: u32);

    fn clear(&mut self);

    /// Draws `frame` stretched over the whole surface.
    fn draw_image(&mut self, frame: &Frame);

    /// Points are in surface pixels.
    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks);

    fn set_style(&mut self, style: &MoodStyle);

    /// Composited contents with the current style applied, if the surface
    /// can be read back.
    fn export(&self) -> Option<Frame> {
        None
    }
}
