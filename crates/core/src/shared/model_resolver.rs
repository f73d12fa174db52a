use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{APP_DIR_NAME, REQUIRED_MODEL_FILES};

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model directory not found: {0}")]
    MissingDir(PathBuf),
    #[error("model file {name} missing from {}", dir.display())]
    MissingFile { dir: PathBuf, name: String },
    #[error("could not determine data directory")]
    NoDataDir,
}

/// Resolve the directory holding the expression engine's weights.
///
/// Resolution order:
/// 1. Explicit directory (must be complete, no fallback)
/// 2. User data directory (platform-specific)
/// 3. Bundled path (for development / pre-packaged installs)
///
/// Weights are never downloaded.
pub fn resolve(
    explicit: Option<&Path>,
    bundled_dir: Option<&Path>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(dir) = explicit {
        verify(dir)?;
        return Ok(dir.to_path_buf());
    }

    let mut last_error = ModelResolveError::NoDataDir;

    match model_data_dir() {
        Ok(dir) => match verify(&dir) {
            Ok(()) => return Ok(dir),
            Err(e) => last_error = e,
        },
        Err(e) => last_error = e,
    }

    if let Some(dir) = bundled_dir {
        match verify(dir) {
            Ok(()) => return Ok(dir.to_path_buf()),
            Err(e) => last_error = e,
        }
    }

    Err(last_error)
}

/// Checks that every model manifest the engine needs is present in `dir`.
pub fn verify(dir: &Path) -> Result<(), ModelResolveError> {
    if !dir.is_dir() {
        return Err(ModelResolveError::MissingDir(dir.to_path_buf()));
    }
    for name in REQUIRED_MODEL_FILES {
        if !dir.join(name).is_file() {
            return Err(ModelResolveError::MissingFile {
                dir: dir.to_path_buf(),
                name: (*name).to_string(),
            });
        }
    }
    Ok(())
}

/// Platform-specific model directory.
///
/// - macOS: `~/Library/Application Support/MoodCam/models/`
/// - Linux: `$XDG_DATA_HOME/MoodCam/models/` or `~/.local/share/MoodCam/models/`
/// - Windows: `%APPDATA%/MoodCam/models/`
pub fn model_data_dir() -> Result<PathBuf, ModelResolveError> {
    dirs::data_dir()
        .map(|d| d.join(APP_DIR_NAME).join("models"))
        .ok_or(ModelResolveError::NoDataDir)
}
