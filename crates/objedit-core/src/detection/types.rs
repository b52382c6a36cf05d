//! Detector output types.

use std::path::PathBuf;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Errors produced while obtaining detections. All of them are fatal for a run.
#[derive(Debug, Error)]
pub enum DetectError {
    /// Score and box sequences are not parallel.
    #[error("Detector returned {scores} score vectors but {boxes} boxes")]
    LengthMismatch { scores: usize, boxes: usize },

    /// A detection file could not be read.
    #[error("Failed to read detections from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A detection file is not valid detection JSON.
    #[error("Failed to parse detections: {0}")]
    Parse(#[from] serde_json::Error),

    /// The detector backend failed.
    #[error("Detector failed: {0}")]
    Backend(String),
}

/// A bounding box in normalized coordinates.
///
/// Coordinates are fractions of the image width (x) and height (y), with the
/// origin at the top-left corner. Values are trusted as emitted by the
/// detector and are not clamped to `[0, 1]`.
///
/// Serialized as a `[x_min, y_min, x_max, y_max]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct NormalizedBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl NormalizedBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Build a box from center format `(cx, cy, w, h)`, as emitted by
    /// DETR-style detectors.
    pub fn from_center(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
    }
}

impl From<[f64; 4]> for NormalizedBox {
    fn from([x_min, y_min, x_max, y_max]: [f64; 4]) -> Self {
        Self::new(x_min, y_min, x_max, y_max)
    }
}

impl From<NormalizedBox> for [f64; 4] {
    fn from(b: NormalizedBox) -> Self {
        [b.x_min, b.y_min, b.x_max, b.y_max]
    }
}

/// Per-class confidence values for one detection.
///
/// The last entry is the "no-object" background class.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassScores(pub Vec<f32>);

impl ClassScores {
    pub fn new(scores: Vec<f32>) -> Self {
        Self(scores)
    }

    /// Scores for the object classes, i.e. everything but the trailing
    /// background entry.
    pub fn object_scores(&self) -> &[f32] {
        match self.0.split_last() {
            Some((_, objects)) => objects,
            None => &[],
        }
    }
}

/// Layout of the four numbers of each box in a detection file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoxFormat {
    /// `[x_min, y_min, x_max, y_max]`.
    #[default]
    #[serde(rename = "xyxy")]
    Corners,
    /// `[center_x, center_y, width, height]`, the DETR `pred_boxes` layout.
    #[serde(rename = "cxcywh")]
    Center,
}

impl BoxFormat {
    /// Read one box laid out in this format.
    pub fn to_box(self, [a, b, c, d]: [f64; 4]) -> NormalizedBox {
        match self {
            BoxFormat::Corners => NormalizedBox::new(a, b, c, d),
            BoxFormat::Center => NormalizedBox::from_center(a, b, c, d),
        }
    }
}

/// Wire shape of [`DetectorOutput`] before the length check.
#[derive(Deserialize)]
struct RawDetectorOutput {
    scores: Vec<ClassScores>,
    boxes: Vec<[f64; 4]>,
    #[serde(default)]
    box_format: BoxFormat,
}

/// Everything the edit pipeline consumes from a detector: two parallel
/// sequences, one score vector and one box per detection, in detector order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DetectorOutput {
    scores: Vec<ClassScores>,
    boxes: Vec<NormalizedBox>,
}

impl<'de> Deserialize<'de> for DetectorOutput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawDetectorOutput::deserialize(deserializer)?;
        let format = raw.box_format;
        let boxes = raw.boxes.into_iter().map(|b| format.to_box(b)).collect();
        Self::new(raw.scores, boxes).map_err(de::Error::custom)
    }
}

impl DetectorOutput {
    /// Pair up scores and boxes.
    ///
    /// # Errors
    ///
    /// Returns `DetectError::LengthMismatch` if the sequences differ in length.
    pub fn new(
        scores: Vec<ClassScores>,
        boxes: Vec<NormalizedBox>,
    ) -> Result<Self, DetectError> {
        if scores.len() != boxes.len() {
            return Err(DetectError::LengthMismatch {
                scores: scores.len(),
                boxes: boxes.len(),
            });
        }
        Ok(Self { scores, boxes })
    }

    /// Output with no detections.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the JSON detection format:
    /// `{"scores": [[...], ...], "boxes": [[x0, y0, x1, y1], ...]}`.
    ///
    /// An optional `"box_format": "cxcywh"` reads the boxes as
    /// `[center_x, center_y, width, height]` instead. Boxes are always
    /// serialized back as corners.
    pub fn from_json(json: &str) -> Result<Self, DetectError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn scores(&self) -> &[ClassScores] {
        &self.scores
    }

    pub fn boxes(&self) -> &[NormalizedBox] {
        &self.boxes
    }

    /// Iterate over `(scores, box)` pairs in detector order.
    pub fn iter(&self) -> impl Iterator<Item = (&ClassScores, &NormalizedBox)> {
        self.scores.iter().zip(self.boxes.iter())
    }
}
