use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mood::domain::expression::Expression;
use crate::shared::constants::LANDMARK_POINT_COUNT;

/// Face bounding box in source-frame pixels with its detection confidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub score: f64,
}

/// 68-point face landmarks in source-frame pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct FaceLandmarks {
    points: Vec<(f64, f64)>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, String> {
        if points.len() != LANDMARK_POINT_COUNT {
            return Err(format!(
                "expected {LANDMARK_POINT_COUNT} landmark points, got {}",
                points.len()
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    fn scaled(&self, sx: f64, sy: f64) -> Self {
        Self {
            points: self.points.iter().map(|&(x, y)| (x * sx, y * sy)).collect(),
        }
    }
}

impl TryFrom<Vec<(f64, f64)>> for FaceLandmarks {
    type Error = String;

    fn try_from(points: Vec<(f64, f64)>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<FaceLandmarks> for Vec<(f64, f64)> {
    fn from(landmarks: FaceLandmarks) -> Self {
        landmarks.points
    }
}

/// Expression scores ranked highest first. Ties keep label order and NaN
/// scores rank last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, f64>", into = "BTreeMap<String, f64>")]
pub struct ExpressionScores {
    ranked: Vec<(String, f64)>,
}

impl ExpressionScores {
    pub fn new(scores: impl IntoIterator<Item = (String, f64)>) -> Self {
        let mut ranked: Vec<(String, f64)> = scores.into_iter().collect();
        let rank = |score: f64| if score.is_nan() { f64::NEG_INFINITY } else { score };
        ranked.sort_by(|a, b| rank(b.1).total_cmp(&rank(a.1)).then_with(|| a.0.cmp(&b.0)));
        Self { ranked }
    }

    pub fn ranked(&self) -> &[(String, f64)] {
        &self.ranked
    }

    pub fn top(&self) -> Option<(&str, f64)> {
        self.ranked.first().map(|(label, score)| (label.as_str(), *score))
    }

    pub fn top_expression(&self) -> Option<Expression> {
        self.top().map(|(label, _)| Expression::from_label(label))
    }
}

impl From<BTreeMap<String, f64>> for ExpressionScores {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self::new(map)
    }
}

impl From<ExpressionScores> for BTreeMap<String, f64> {
    fn from(scores: ExpressionScores) -> Self {
        scores.ranked.into_iter().collect()
    }
}

/// The single face the engine found in a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceDetection {
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub landmarks: Option<FaceLandmarks>,
    pub expressions: ExpressionScores,
    /// Size of the frame the coordinates refer to.
    pub source_width: u32,
    pub source_height: u32,
}

impl FaceDetection {
    pub fn top_expression(&self) -> Option<Expression> {
        self.expressions.top_expression()
    }

    /// Landmarks mapped onto a surface of the given size.
    pub fn landmarks_for(&self, width: u32, height: u32) -> Option<FaceLandmarks> {
        let landmarks = self.landmarks.as_ref()?;
        if self.source_width == 0 || self.source_height == 0 {
            return Some(landmarks.clone());
        }
        let sx = width as f64 / self.source_width as f64;
        let sy = height as f64 / self.source_height as f64;
        Some(landmarks.scaled(sx, sy))
    }
}
