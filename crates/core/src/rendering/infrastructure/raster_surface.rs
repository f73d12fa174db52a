use image::imageops::{self, FilterType};

use crate::detection::domain::face_detection::FaceLandmarks;
use crate::mood::domain::mood_style::MoodStyle;
use crate::rendering::domain::drawing_surface::DrawingSurface;
use crate::shared::constants::{LANDMARK_COLOR, LANDMARK_RADIUS, OVERLAY_COLOR};
use crate::shared::frame::Frame;

/// In-memory RGB drawing surface backed by a [`Frame`].
///
/// The style is stored rather than baked into the pixels, so the raw
/// contents stay untouched and [`export`](DrawingSurface::export) applies
/// the current style on read-back.
pub struct RasterSurface {
    canvas: Frame,
    style: MoodStyle,
}

impl RasterSurface {
    pub fn new() -> Self {
        Self {
            canvas: Frame::blank(0, 0, 0),
            style: MoodStyle::identity(),
        }
    }

    /// Unstyled pixels.
    pub fn pixels(&self) -> &Frame {
        &self.canvas
    }

    pub fn style(&self) -> &MoodStyle {
        &self.style
    }

    fn fill_square(&mut self, cx: f64, cy: f64) {
        let (width, height) = (self.canvas.width() as i64, self.canvas.height() as i64);
        if width == 0 || height == 0 {
            return;
        }
        let (cx, cy) = (cx.round() as i64, cy.round() as i64);
        let r = LANDMARK_RADIUS as i64;
        let x0 = (cx - r).max(0);
        let x1 = (cx + r).min(width - 1);
        let y0 = (cy - r).max(0);
        let y1 = (cy + r).min(height - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        let mut pixels = self.canvas.as_ndarray_mut();
        for y in y0..=y1 {
            for x in x0..=x1 {
                for (c, value) in LANDMARK_COLOR.iter().enumerate() {
                    pixels[[y as usize, x as usize, c]] = *value;
                }
            }
        }
    }
}

impl Default for RasterSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        if self.size() != (width, height) {
            self.canvas = Frame::blank(width, height, self.canvas.index());
        }
    }

    fn clear(&mut self) {
        self.canvas.data_mut().fill(0);
    }

    fn draw_image(&mut self, frame: &Frame) {
        let (width, height) = self.size();
        if width == 0 || height == 0 {
            return;
        }
        let Some(source) = frame.to_rgb_image() else {
            log::warn!(
                "Cannot draw {}-channel frame on an RGB surface",
                frame.channels()
            );
            return;
        };
        let scaled = if source.dimensions() == (width, height) {
            source
        } else {
            imageops::resize(&source, width, height, FilterType::Triangle)
        };
        self.canvas = Frame::from_rgb_image(scaled, frame.index())
            .with_presented_at(frame.presented_at());
    }

    fn draw_landmarks(&mut self, landmarks: &FaceLandmarks) {
        for &(x, y) in landmarks.points() {
            self.fill_square(x, y);
        }
    }

    fn set_style(&mut self, style: &MoodStyle) {
        self.style = style.clone();
    }

    fn export(&self) -> Option<Frame> {
        let mut image = self.canvas.to_rgb_image()?;

        if let Some(deg) = self.style.hue_rotation_deg {
            image = imageops::huerotate(&image, deg.round() as i32);
        }
        if let Some(opacity) = self.style.overlay_opacity {
            let alpha = opacity.clamp(0.0, 1.0);
            for pixel in image.pixels_mut() {
                for (channel, tint) in pixel.0.iter_mut().zip(OVERLAY_COLOR) {
                    let blended = *channel as f64 * (1.0 - alpha) + tint as f64 * alpha;
                    *channel = blended.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Some(
            Frame::from_rgb_image(image, self.canvas.index())
                .with_presented_at(self.canvas.presented_at()),
        )
    }
}

/// Lays the non-black pixels of `layer` over `base`.
///
/// Used to put the landmark canvas on top of the styled video. Returns
/// `None` when the two differ in size or either is not RGB.
pub fn composite(base: &Frame, layer: &Frame) -> Option<Frame> {
    if (base.width(), base.height()) != (layer.width(), layer.height())
        || base.channels() != 3
        || layer.channels() != 3
    {
        return None;
    }
    let mut out = base.clone();
    for (dst, src) in out
        .data_mut()
        .chunks_exact_mut(3)
        .zip(layer.data().chunks_exact(3))
    {
        if src.iter().any(|&v| v != 0) {
            dst.copy_from_slice(src);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::domain::mood::MoodRange;
    use crate::mood::domain::mood_style::StyleMode;
    use crate::shared::constants::LANDMARK_POINT_COUNT;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Frame {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width * height * 3) as usize)
            .collect();
        Frame::new(data, width, height, 3, 7)
    }

    fn sized(width: u32, height: u32) -> RasterSurface {
        let mut surface = RasterSurface::new();
        surface.set_size(width, height);
        surface
    }

    #[test]
    fn test_starts_empty() {
        let surface = RasterSurface::new();
        assert_eq!(surface.size(), (0, 0));
        assert_eq!(surface.style(), &MoodStyle::identity());
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [9, 9, 9]));
        surface.set_size(8, 6);

        assert_eq!(surface.size(), (8, 6));
        assert!(surface.pixels().data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_same_size_keeps_contents() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [9, 9, 9]));
        surface.set_size(4, 4);
        assert_eq!(surface.pixels().data()[0], 9);
    }

    #[test]
    fn test_draw_image_scales_to_surface() {
        let mut surface = sized(8, 6);
        surface.draw_image(&solid(16, 12, [40, 80, 120]));

        assert_eq!(surface.size(), (8, 6));
        assert_eq!(surface.pixels().data()[..3], [40, 80, 120]);
        assert_eq!(surface.pixels().index(), 7);
    }

    #[test]
    fn test_clear_zeroes_pixels() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [1, 2, 3]));
        surface.clear();
        assert!(surface.pixels().data().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_landmarks_drawn_as_squares() {
        let mut surface = sized(20, 20);
        let landmarks = FaceLandmarks::new(vec![(10.0, 10.0); LANDMARK_POINT_COUNT]).unwrap();
        surface.draw_landmarks(&landmarks);

        let pixels = surface.pixels().as_ndarray();
        assert_eq!(pixels[[10, 10, 1]], LANDMARK_COLOR[1]);
        assert_eq!(pixels[[12, 8, 1]], LANDMARK_COLOR[1]);
        assert_eq!(pixels[[13, 10, 1]], 0);
    }

    #[test]
    fn test_landmarks_at_edges_are_clipped() {
        let mut surface = sized(5, 5);
        let landmarks = FaceLandmarks::new(vec![(-1.0, 4.5); LANDMARK_POINT_COUNT]).unwrap();
        surface.draw_landmarks(&landmarks);
        assert_eq!(surface.pixels().as_ndarray()[[4, 0, 1]], LANDMARK_COLOR[1]);
    }

    #[test]
    fn test_export_identity_returns_raw_pixels() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [10, 20, 30]));
        let exported = surface.export().unwrap();
        assert_eq!(exported.data(), surface.pixels().data());
    }

    #[test]
    fn test_export_full_opacity_is_overlay_colour() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [10, 20, 30]));
        let range = MoodRange::new(0, 180).unwrap();
        surface.set_style(&MoodStyle::from_value(180, range, StyleMode::Overlay));

        let exported = surface.export().unwrap();
        assert_eq!(exported.data()[..3], OVERLAY_COLOR);
    }

    #[test]
    fn test_export_zero_opacity_leaves_pixels() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [10, 20, 30]));
        let range = MoodRange::new(0, 180).unwrap();
        surface.set_style(&MoodStyle::from_value(0, range, StyleMode::Overlay));

        assert_eq!(surface.export().unwrap().data()[..3], [10, 20, 30]);
    }

    #[test]
    fn test_export_hue_rotation_changes_colour() {
        let mut surface = sized(4, 4);
        surface.draw_image(&solid(4, 4, [200, 30, 30]));
        let range = MoodRange::new(0, 180).unwrap();
        surface.set_style(&MoodStyle::from_value(120, range, StyleMode::HueRotate));

        let exported = surface.export().unwrap();
        assert_ne!(exported.data()[..3], [200, 30, 30]);
        assert_eq!(surface.pixels().data()[..3], [200, 30, 30]);
    }

    #[test]
    fn test_composite_overlays_non_black_pixels() {
        let base = solid(2, 1, [5, 5, 5]);
        let mut layer = Frame::blank(2, 1, 0);
        layer.data_mut()[3..6].copy_from_slice(&LANDMARK_COLOR);

        let out = composite(&base, &layer).unwrap();
        assert_eq!(out.data()[..3], [5, 5, 5]);
        assert_eq!(out.data()[3..6], LANDMARK_COLOR);
    }

    #[test]
    fn test_composite_rejects_size_mismatch() {
        assert!(composite(&Frame::blank(2, 2, 0), &Frame::blank(3, 2, 0)).is_none());
    }
}
