//! Class selection and projection of normalized boxes into pixel space.
//!
//! # Algorithm
//!
//! For each detection, the arg-max over the class-confidence vector is taken
//! with the trailing background class left out. Detections whose arg-max is the
//! target class are kept, in detector order, and their boxes are scaled by
//! `(width, height, width, height)` and truncated toward zero:
//!
//! ```text
//! x_min = trunc(box.x_min * width)     y_min = trunc(box.y_min * height)
//! x_max = trunc(box.x_max * width)     y_max = trunc(box.y_max * height)
//! ```
//!
//! Truncation (not rounding) is deliberate: a box ending exactly on the image
//! edge projects to `x_max == width`, which is still in bounds.

use tracing::debug;

use crate::detection::{ClassScores, DetectorOutput, NormalizedBox};
use crate::region::PixelRect;

/// Label index of the class that gets edited.
///
/// Index 1 is the first non-background entry in the label scheme of the
/// detectors this tool was built against. Override it through
/// [`EditConfig::target_class`](crate::EditConfig) for other label schemes.
pub const DEFAULT_TARGET_CLASS: usize = 1;

/// Index of the most confident object class, ignoring the background entry.
///
/// Ties resolve to the lowest index and NaN scores never win. Returns `None`
/// when there is no object class to choose from.
pub fn argmax_class(scores: &ClassScores) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &score) in scores.object_scores().iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((idx, score)),
        }
    }
    best.map(|(idx, _)| idx)
}

/// Scale a normalized box to pixel coordinates, truncating toward zero.
pub fn project_box(b: &NormalizedBox, width: u32, height: u32) -> PixelRect {
    let w = width as f64;
    let h = height as f64;
    PixelRect::new(
        (b.x_min * w) as i64,
        (b.y_min * h) as i64,
        (b.x_max * w) as i64,
        (b.y_max * h) as i64,
    )
}

/// Pixel rectangles for every detection of `target_class`, in detector order.
///
/// An empty result is not an error: it just means nothing gets edited.
pub fn project_detections(
    detections: &DetectorOutput,
    target_class: usize,
    width: u32,
    height: u32,
) -> Vec<PixelRect> {
    detections
        .iter()
        .enumerate()
        .filter(|(_, (scores, _))| argmax_class(scores) == Some(target_class))
        .map(|(index, (_, b))| {
            let rect = project_box(b, width, height);
            debug!(index, %rect, "projected detection");
            rect
        })
        .collect()
}


// ============================================================================
// Property-Based Tests
// ============================================================================
