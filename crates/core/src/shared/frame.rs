use std::time::Duration;

use ndarray::{ArrayView3, ArrayViewMut3};

/// What a frame callback learns about the frame being presented.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameMetadata {
    pub width: u32,
    pub height: u32,
    pub index: usize,
    pub presented_at: Duration,
}

/// A single presented video frame: contiguous RGB bytes in row-major order.
///
/// Frames are transient. A callback may clone one to hand it to a detector,
/// but nothing in the pipeline retains a frame past the next presentation.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    presented_at: Duration,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            presented_at: Duration::ZERO,
        }
    }

    /// Black RGB frame of the given size.
    pub fn blank(width: u32, height: u32, index: usize) -> Self {
        Self::new(
            vec![0u8; (width as usize) * (height as usize) * 3],
            width,
            height,
            3,
            index,
        )
    }

    pub fn from_rgb_image(image: image::RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn with_presented_at(mut self, presented_at: Duration) -> Self {
        self.presented_at = presented_at;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn presented_at(&self) -> Duration {
        self.presented_at
    }

    pub fn metadata(&self) -> FrameMetadata {
        FrameMetadata {
            width: self.width,
            height: self.height,
            index: self.index,
            presented_at: self.presented_at,
        }
    }

    /// Copies the pixels into an `image` buffer. `None` unless the frame is RGB.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        if self.channels != 3 {
            return None;
        }
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
