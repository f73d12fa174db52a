use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mood::domain::mood::{Mood, MoodRange};

/// Which cosmetic channels the mood drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleMode {
    HueRotate,
    Overlay,
    Both,
}

impl StyleMode {
    pub const ALL: &[StyleMode] = &[StyleMode::HueRotate, StyleMode::Overlay, StyleMode::Both];

    fn hue(self) -> bool {
        matches!(self, StyleMode::HueRotate | StyleMode::Both)
    }

    fn overlay(self) -> bool {
        matches!(self, StyleMode::Overlay | StyleMode::Both)
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleMode::HueRotate => write!(f, "hue-rotate"),
            StyleMode::Overlay => write!(f, "overlay"),
            StyleMode::Both => write!(f, "both"),
        }
    }
}

/// Visual style derived from a mood value. A pure function of its inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct MoodStyle {
    /// Hue rotation in degrees; the mood value itself.
    pub hue_rotation_deg: Option<f64>,
    /// Overlay opacity in `[0, 1]`, proportional to `mood / max`.
    pub overlay_opacity: Option<f64>,
}

impl MoodStyle {
    pub fn for_mood(mood: &Mood, mode: StyleMode) -> Self {
        Self::from_value(mood.value(), mood.range(), mode)
    }

    pub fn from_value(value: i32, range: MoodRange, mode: StyleMode) -> Self {
        let value = range.clamp(value);
        let opacity = if range.max() > 0 {
            (value as f64 / range.max() as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            hue_rotation_deg: mode.hue().then_some(value as f64),
            overlay_opacity: mode.overlay().then_some(opacity),
        }
    }

    /// Style that leaves the image untouched.
    pub fn identity() -> Self {
        Self {
            hue_rotation_deg: None,
            overlay_opacity: None,
        }
    }

    pub fn filter_css(&self) -> String {
        match self.hue_rotation_deg {
            Some(deg) => format!("hue-rotate({deg:.0}deg)"),
            None => "none".to_string(),
        }
    }

    pub fn to_css(&self) -> String {
        let mut decls = vec![format!("filter: {}", self.filter_css())];
        if let Some(opacity) = self.overlay_opacity {
            decls.push(format!("opacity: {opacity:.2}"));
        }
        decls.join("; ")
    }
}
