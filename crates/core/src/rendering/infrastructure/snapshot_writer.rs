use std::fs;
use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot create snapshot directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("frame {0} is not an RGB image")]
    NotRgb(usize),
    #[error("failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        source: image::ImageError,
    },
}

/// Writes composited frames as numbered PNG files.
///
/// Every `every`-th frame index is kept; the rest are skipped so long
/// sessions do not flood the output directory.
pub struct SnapshotWriter {
    dir: PathBuf,
    every: usize,
    written: usize,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>, every: usize) -> Self {
        Self {
            dir: dir.into(),
            every: every.max(1),
            written: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub fn wants(&self, frame_index: usize) -> bool {
        frame_index % self.every == 0
    }

    pub fn path_for(&self, frame_index: usize) -> PathBuf {
        self.dir.join(format!("frame_{frame_index:06}.png"))
    }

    /// Saves `frame` when its index is due. Returns the written path.
    pub fn write(&mut self, frame: &Frame) -> Result<Option<PathBuf>, SnapshotError> {
        if !self.wants(frame.index()) {
            return Ok(None);
        }

        fs::create_dir_all(&self.dir).map_err(|source| SnapshotError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let image = frame
            .to_rgb_image()
            .ok_or(SnapshotError::NotRgb(frame.index()))?;
        let path = self.path_for(frame.index());
        image.save(&path).map_err(|source| SnapshotError::Save {
            path: path.clone(),
            source,
        })?;

        self.written += 1;
        log::debug!("Wrote snapshot {}", path.display());
        Ok(Some(path))
    }
}
