//! Detection-to-edit pipeline.
//!
//! A run moves through fixed stages: detections come in (from the caller or
//! from a [`Detector`]), target-class boxes are projected to pixel
//! rectangles, each rectangle is validated, and every valid one is edited in
//! detector order. Per-region failures are logged and recorded in the
//! [`EditReport`]; they never stop the run. Bad run inputs are fatal and are
//! refused before any pixel is touched: a failing detector, a rotation angle
//! that is not finite, or an image whose buffer disagrees with its size.

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::decode::DecodedImage;
use crate::detection::{DetectError, Detector, DetectorOutput};
use crate::edit::{apply_mask, apply_region_rotation};
use crate::project::project_detections;
use crate::region::{validate_region, PixelRect, RegionError, ValidRegion};
use crate::{EditConfig, EditMode};

/// Fatal pipeline errors. No edited image is produced.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("Detection failed: {0}")]
    Detection(#[from] DetectError),

    #[error("Rotation angle must be a finite number of degrees, got {angle}")]
    NonFiniteAngle { angle: f64 },

    #[error("Pixel buffer holds {actual} bytes but a {width}x{height} RGB image needs {expected}")]
    MalformedImage {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}

/// A projected rectangle that was not edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRegion {
    /// Position among the target-class detections, in detector order.
    pub candidate: usize,
    pub rect: PixelRect,
    pub reason: RegionError,
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditReport {
    /// Number of target-class detections.
    pub candidates: usize,
    /// Number of regions edited.
    pub applied: usize,
    /// Regions skipped, in detector order.
    pub skipped: Vec<SkippedRegion>,
}

impl EditReport {
    /// True if nothing in the image was touched.
    pub fn is_noop(&self) -> bool {
        self.applied == 0
    }
}

/// The edited image together with the run's report.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub image: DecodedImage,
    pub report: EditReport,
}

/// Applies one [`EditMode`] to every target-class detection of an image.
#[derive(Debug, Clone, Default)]
pub struct EditPipeline {
    config: EditConfig,
}

impl EditPipeline {
    pub fn new(config: EditConfig) -> Self {
        Self { config }
    }

    /// Edit `image` in place and report what happened.
    ///
    /// Once the image and mode are accepted, the run always completes:
    /// invalid rectangles are skipped with a warning.
    ///
    /// # Errors
    ///
    /// `EditError::NonFiniteAngle` or `EditError::MalformedImage`; the image is
    /// untouched in both cases.
    #[instrument(skip_all, fields(width = image.width, height = image.height, %mode))]
    pub fn apply(
        &self,
        image: &mut DecodedImage,
        detections: &DetectorOutput,
        mode: EditMode,
    ) -> Result<EditReport, EditError> {
        check_inputs(image, mode)?;

        let rects = project_detections(
            detections,
            self.config.target_class,
            image.width,
            image.height,
        );
        debug!(
            detections = detections.len(),
            candidates = rects.len(),
            target_class = self.config.target_class,
            "projected detections"
        );

        let mut report = EditReport {
            candidates: rects.len(),
            ..EditReport::default()
        };

        for (candidate, rect) in rects.into_iter().enumerate() {
            let edited = validate_region(rect, image.width, image.height)
                .and_then(|region| self.edit_region(image, &region, mode));

            match edited {
                Ok(()) => report.applied += 1,
                Err(reason) => {
                    warn!(candidate, %rect, %reason, "skipping region");
                    report.skipped.push(SkippedRegion {
                        candidate,
                        rect,
                        reason,
                    });
                }
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped.len(),
            "edit finished"
        );
        Ok(report)
    }

    /// Take ownership of `image`, edit it, and hand it back with the report.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn run(
        &self,
        mut image: DecodedImage,
        detections: &DetectorOutput,
        mode: EditMode,
    ) -> Result<EditOutcome, EditError> {
        let report = self.apply(&mut image, detections, mode)?;
        Ok(EditOutcome { image, report })
    }

    /// Run `detector` on `image`, then edit it.
    ///
    /// Inputs are checked before the detector is called.
    ///
    /// # Errors
    ///
    /// Returns `EditError::Detection` if the detector fails, otherwise the
    /// same as [`apply`](Self::apply).
    pub fn detect_and_run(
        &self,
        detector: &dyn Detector,
        image: DecodedImage,
        mode: EditMode,
    ) -> Result<EditOutcome, EditError> {
        check_inputs(&image, mode)?;
        let detections = detector.detect(&image)?;
        self.run(image, &detections, mode)
    }

    fn edit_region(
        &self,
        image: &mut DecodedImage,
        region: &ValidRegion,
        mode: EditMode,
    ) -> Result<(), RegionError> {
        match mode {
            EditMode::Mask => apply_mask(image, region, self.config.fill_color),
            EditMode::Rotate { angle_degrees } => {
                apply_region_rotation(image, region, angle_degrees, self.config.filter)
            }
        }
    }
}

/// Refuse inputs that would make every region edit fail or panic.
fn check_inputs(image: &DecodedImage, mode: EditMode) -> Result<(), EditError> {
    if !image.has_consistent_buffer() {
        return Err(EditError::MalformedImage {
            width: image.width,
            height: image.height,
            expected: image.expected_byte_size(),
            actual: image.byte_size(),
        });
    }
    if let EditMode::Rotate { angle_degrees } = mode {
        if !angle_degrees.is_finite() {
            return Err(EditError::NonFiniteAngle {
                angle: angle_degrees,
            });
        }
    }
    Ok(())
}
