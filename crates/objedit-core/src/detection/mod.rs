//! The detector boundary.
//!
//! Object detection itself happens outside this crate. What the edit pipeline
//! needs from a detector is captured by [`DetectorOutput`]: per detection, a
//! class-confidence vector (background class last) and a normalized box.
//!
//! A detector is constructed once, never mutated, and handed to the pipeline
//! by reference through the [`Detector`] trait. [`PrecomputedDetector`] serves
//! detections that were produced earlier and stored as JSON.

mod types;

use std::path::Path;

pub use types::{BoxFormat, ClassScores, DetectError, DetectorOutput, NormalizedBox};

use crate::decode::DecodedImage;

/// Source of detections for an image.
pub trait Detector {
    /// Run detection on `image`.
    fn detect(&self, image: &DecodedImage) -> Result<DetectorOutput, DetectError>;
}

/// A detector that returns a fixed, previously computed result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrecomputedDetector {
    output: DetectorOutput,
}

impl PrecomputedDetector {
    pub fn new(output: DetectorOutput) -> Self {
        Self { output }
    }

    /// Parse detections from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, DetectError> {
        DetectorOutput::from_json(json).map(Self::new)
    }

    /// Load detections from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, DetectError> {
        let json = std::fs::read_to_string(path).map_err(|source| DetectError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn output(&self) -> &DetectorOutput {
        &self.output
    }
}

impl Detector for PrecomputedDetector {
    fn detect(&self, _image: &DecodedImage) -> Result<DetectorOutput, DetectError> {
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precomputed_detector_returns_stored_output() {
        let output = DetectorOutput::new(
            vec![ClassScores::new(vec![0.1, 0.8, 0.1])],
            vec![NormalizedBox::new(0.1, 0.1, 0.4, 0.4)],
        )
        .unwrap();
        let detector = PrecomputedDetector::new(output.clone());

        let image = DecodedImage::filled(10, 10, [0, 0, 0]);
        assert_eq!(detector.detect(&image).unwrap(), output);
        // Same answer on every call
        assert_eq!(detector.detect(&image).unwrap(), output);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = PrecomputedDetector::from_path(Path::new("/nonexistent/detections.json"));
        match result {
            Err(DetectError::Io { path, .. }) => {
                assert_eq!(path, Path::new("/nonexistent/detections.json"));
            }
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json() {
        let detector =
            PrecomputedDetector::from_json(r#"{"scores": [], "boxes": []}"#).unwrap();
        assert!(detector.output().is_empty());
    }
}
