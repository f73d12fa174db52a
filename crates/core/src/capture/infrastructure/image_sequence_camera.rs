use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::capture::domain::camera::{Camera, CaptureError, CaptureRequest, MediaStream};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

/// Adapts a directory of still images to the [`Camera`] interface.
///
/// Files are played in name order at a fixed frame rate, which makes
/// recorded sessions replayable without a physical device. With pacing
/// enabled the stream sleeps between frames to hold real-time cadence.
pub struct ImageSequenceCamera {
    dir: PathBuf,
    fps: f64,
    looped: bool,
    paced: bool,
}

impl ImageSequenceCamera {
    pub fn new(dir: impl Into<PathBuf>, fps: f64) -> Self {
        Self {
            dir: dir.into(),
            fps,
            looped: false,
            paced: false,
        }
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn paced(mut self, paced: bool) -> Self {
        self.paced = paced;
        self
    }
}

impl Camera for ImageSequenceCamera {
    fn request_access(
        &mut self,
        request: CaptureRequest,
    ) -> Result<Box<dyn MediaStream>, CaptureError> {
        if !request.video {
            return Err(CaptureError::Unsupported(
                "image sequences only provide video".into(),
            ));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(CaptureError::Unsupported(format!(
                "frame rate must be positive, got {}",
                self.fps
            )));
        }
        let frame_interval = Duration::try_from_secs_f64(1.0 / self.fps).map_err(|e| {
            CaptureError::Unsupported(format!("frame rate {} is too low: {e}", self.fps))
        })?;
        if request.audio {
            log::warn!("Audio requested but image sequences have none; continuing video-only");
        }

        let paths = list_images(&self.dir)?;
        log::info!(
            "Opened {} frames from {} at {:.1} fps",
            paths.len(),
            self.dir.display(),
            self.fps
        );

        Ok(Box::new(ImageSequenceStream {
            paths,
            position: 0,
            emitted: 0,
            frame_interval,
            looped: self.looped,
            paced: self.paced,
            started: None,
            stopped: false,
        }))
    }
}

fn list_images(dir: &Path) -> Result<Vec<PathBuf>, CaptureError> {
    let entries = fs::read_dir(dir).map_err(|e| match e.kind() {
        ErrorKind::NotFound => CaptureError::NoDevice(format!("{} does not exist", dir.display())),
        ErrorKind::PermissionDenied => CaptureError::PermissionDenied(dir.display().to_string()),
        _ => CaptureError::NoDevice(format!("{}: {e}", dir.display())),
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_image(path))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(CaptureError::NoDevice(format!(
            "no images found in {}",
            dir.display()
        )));
    }
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
}

/// Time of frame `index` from the start of the stream, saturating at
/// `Duration::MAX`.
fn frame_offset(interval: Duration, index: usize) -> Duration {
    u32::try_from(index)
        .ok()
        .and_then(|n| interval.checked_mul(n))
        .unwrap_or(Duration::MAX)
}

struct ImageSequenceStream {
    paths: Vec<PathBuf>,
    position: usize,
    emitted: usize,
    frame_interval: Duration,
    looped: bool,
    paced: bool,
    started: Option<Instant>,
    stopped: bool,
}

impl ImageSequenceStream {
    fn wait_for_slot(&mut self) {
        let started = *self.started.get_or_insert_with(Instant::now);
        let due = frame_offset(self.frame_interval, self.emitted);
        let elapsed = started.elapsed();
        if due > elapsed {
            thread::sleep(due - elapsed);
        }
    }
}

impl MediaStream for ImageSequenceStream {
    fn next_frame(&mut self) -> Option<Result<Frame, CaptureError>> {
        if self.stopped {
            return None;
        }
        if self.position >= self.paths.len() {
            if !self.looped {
                return None;
            }
            self.position = 0;
        }
        if self.paced {
            self.wait_for_slot();
        }

        let path = &self.paths[self.position];
        let index = self.emitted;
        self.position += 1;
        self.emitted += 1;

        let presented_at = frame_offset(self.frame_interval, index);
        Some(
            image::open(path)
                .map(|img| Frame::from_rgb_image(img.into_rgb8(), index).with_presented_at(presented_at))
                .map_err(|e| CaptureError::Stream(format!("{}: {e}", path.display()))),
        )
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}
