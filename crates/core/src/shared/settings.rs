use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::domain::camera::CaptureRequest;
use crate::mood::domain::mood::{Mood, MoodError, MoodRange};
use crate::mood::domain::mood_style::StyleMode;
use crate::shared::constants::{APP_DIR_NAME, DEFAULT_FPS, MOOD_MAX, MOOD_MIN, MOOD_STEP};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// User-tunable session parameters, persisted as JSON.
///
/// Missing fields fall back to their defaults so older files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub mood_min: i32,
    pub mood_max: i32,
    pub mood_step: i32,
    /// Starting mood; `None` starts at `mood_max`.
    pub initial_mood: Option<i32>,
    pub style: StyleMode,
    pub fps: f64,
    pub request_audio: bool,
    pub model_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mood_min: MOOD_MIN,
            mood_max: MOOD_MAX,
            mood_step: MOOD_STEP,
            initial_mood: None,
            style: StyleMode::Both,
            fps: DEFAULT_FPS,
            request_audio: false,
            model_dir: None,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR_NAME).join("settings.json"))
    }

    /// Loads from the default location, falling back to defaults when the
    /// file is absent or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings file: {e}");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let write_err = |source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        fs::write(path, json).map_err(write_err)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.mood_range()?;
        if self.mood_step <= 0 {
            return Err(SettingsError::Invalid(format!(
                "mood_step must be positive, got {}",
                self.mood_step
            )));
        }
        if !(self.fps.is_finite() && self.fps > 0.0) {
            return Err(SettingsError::Invalid(format!(
                "fps must be positive, got {}",
                self.fps
            )));
        }
        Ok(())
    }

    pub fn mood_range(&self) -> Result<MoodRange, SettingsError> {
        MoodRange::new(self.mood_min, self.mood_max)
            .map_err(|e| SettingsError::Invalid(e.to_string()))
    }

    pub fn build_mood(&self) -> Result<Mood, MoodError> {
        let range = MoodRange::new(self.mood_min, self.mood_max)?;
        let initial = self.initial_mood.unwrap_or(range.max());
        Mood::new(range, self.mood_step, initial)
    }

    pub fn capture_request(&self) -> CaptureRequest {
        CaptureRequest {
            video: true,
            audio: self.request_audio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.mood_min, 0);
        assert_eq!(settings.mood_max, 180);
        assert_eq!(settings.style, StyleMode::Both);
    }

    #[test]
    fn test_default_mood_starts_at_max() {
        let mood = Settings::default().build_mood().unwrap();
        assert_eq!(mood.value(), 180);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            mood_step: 6,
            initial_mood: Some(30),
            style: StyleMode::Overlay,
            request_audio: true,
            ..Settings::default()
        };

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "mood_step": 20, "style": "hue-rotate" }"#).unwrap();

        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded.mood_step, 20);
        assert_eq!(loaded.style, StyleMode::HueRotate);
        assert_eq!(loaded.mood_max, 180);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Settings::load_from(Path::new("/nonexistent/settings.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let settings = Settings {
            mood_min: 50,
            mood_max: 10,
            ..Settings::default()
        };
        assert!(matches!(settings.validate(), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_non_positive_step_and_fps() {
        let zero_step = Settings {
            mood_step: 0,
            ..Settings::default()
        };
        assert!(zero_step.validate().is_err());

        let zero_fps = Settings {
            fps: 0.0,
            ..Settings::default()
        };
        assert!(zero_fps.validate().is_err());
    }

    #[test]
    fn test_capture_request_reflects_audio_flag() {
        let settings = Settings {
            request_audio: true,
            ..Settings::default()
        };
        let request = settings.capture_request();
        assert!(request.video);
        assert!(request.audio);
    }
}
