//! objedit core - detection-driven region editing
//!
//! This crate turns the output of an object detector into pixel edits on the
//! image it ran on: every detection of the target class is either masked with
//! a flat color or has its content rotated in place.
//!
//! # Modules
//!
//! - [`detection`]: detector output contract and the `Detector` trait
//! - [`project`]: class selection and normalized-to-pixel box projection
//! - [`region`]: pixel rectangles and bounds validation
//! - [`edit`]: mask and rotation editors
//! - [`pipeline`]: the end-to-end edit pipeline
//! - [`decode`] / [`encode`]: conversion between image files and pixels

pub mod decode;
pub mod detection;
pub mod edit;
pub mod encode;
pub mod pipeline;
pub mod project;
pub mod region;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use decode::{decode_image, DecodeError, DecodedImage};
pub use detection::{
    BoxFormat, ClassScores, DetectError, Detector, DetectorOutput, NormalizedBox,
};
pub use edit::{InterpolationFilter, MASK_RED};
pub use encode::{encode_image, EncodeError, OutputFormat};
pub use pipeline::{EditError, EditOutcome, EditPipeline, EditReport, SkippedRegion};
pub use project::DEFAULT_TARGET_CLASS;
pub use region::{PixelRect, RegionError, ValidRegion};

/// The edit applied to every detected region in a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditMode {
    /// Fill the region with [`EditConfig::fill_color`].
    Mask,
    /// Rotate the region's content about its center.
    Rotate {
        /// Degrees, positive = counter-clockwise.
        angle_degrees: f64,
    },
}

impl fmt::Display for EditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditMode::Mask => f.write_str("mask"),
            EditMode::Rotate { angle_degrees } => write!(f, "rotate {angle_degrees}°"),
        }
    }
}

/// Settings shared by every run of a pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Detector label index to edit (default 1, see [`DEFAULT_TARGET_CLASS`]).
    pub target_class: usize,
    /// RGB color used by mask mode (default red).
    pub fill_color: [u8; 3],
    /// Resampling filter used by rotate mode (default bilinear).
    pub filter: InterpolationFilter,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            target_class: DEFAULT_TARGET_CLASS,
            fill_color: MASK_RED,
            filter: InterpolationFilter::default(),
        }
    }
}

impl EditConfig {
    /// Create a config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON config; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
