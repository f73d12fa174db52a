/// Mood range used when no settings override it. Mood doubles as a hue
/// rotation in degrees, hence the half-turn upper bound.
pub const MOOD_MIN: i32 = 0;
pub const MOOD_MAX: i32 = 180;

/// Mood gained per "happy" frame; "neutral" frames lose half of it.
pub const MOOD_STEP: i32 = 10;

/// Landmark topology produced by the expression engine.
pub const LANDMARK_POINT_COUNT: usize = 68;

/// Fixed local directory the engine loads its weights from.
pub const DEFAULT_MODEL_DIR: &str = "models";

pub const REQUIRED_MODEL_FILES: &[&str] = &[
    "tiny_face_detector_model-weights_manifest.json",
    "face_landmark_68_model-weights_manifest.json",
    "face_expression_model-weights_manifest.json",
];

pub const APP_DIR_NAME: &str = "MoodCam";

pub const DEFAULT_FPS: f64 = 30.0;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

pub const LANDMARK_COLOR: [u8; 3] = [0, 255, 128];
pub const LANDMARK_RADIUS: u32 = 2;

/// Warm tint blended over the video at the mood-driven opacity.
pub const OVERLAY_COLOR: [u8; 3] = [255, 96, 160];

/// Consecutive unreadable frames tolerated before the pump gives up.
pub const MAX_CONSECUTIVE_STREAM_ERRORS: usize = 3;
