//! Pixel rectangles and their validation against image bounds.
//!
//! A [`PixelRect`] is whatever the projector produced and may lie partly or
//! entirely outside the image. Only [`validate_region`] turns it into a
//! [`ValidRegion`], and the editors accept nothing else, so every pixel write
//! goes through the bounds checks below.

use std::fmt;

use thiserror::Error;

use crate::decode::DecodedImage;

/// An integer rectangle in image pixel coordinates.
///
/// Covers the half-open ranges `[x_min, x_max) x [y_min, y_max)`. Ordering of
/// the corners is not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl PixelRect {
    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Signed area `(x_max - x_min) * (y_max - y_min)`.
    ///
    /// Widened to `i128` so that extreme coordinates cannot overflow.
    pub fn area(&self) -> i128 {
        let dx = self.x_max as i128 - self.x_min as i128;
        let dy = self.y_max as i128 - self.y_min as i128;
        dx * dy
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.x_min, self.y_min, self.x_max, self.y_max
        )
    }
}

/// Why a rectangle was not edited.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// `x_min` or `y_min` is negative.
    #[error("box {rect} starts outside the image (negative origin)")]
    NegativeOrigin { rect: PixelRect },

    /// `x_max` or `y_max` lies past the image edge.
    #[error("box {rect} extends past the {width}x{height} image")]
    ExceedsBounds {
        rect: PixelRect,
        width: u32,
        height: u32,
    },

    /// `(x_max - x_min) * (y_max - y_min)` is zero or negative.
    #[error("box {rect} has no area")]
    EmptyArea { rect: PixelRect },

    /// The box passed the bounds checks but covers no pixels.
    #[error("box {rect} yields an empty crop")]
    EmptyExtraction { rect: PixelRect },

    /// A patch written back into a region does not have the region's size.
    #[error("patch of {actual_width}x{actual_height} does not fit region {rect}")]
    PatchSizeMismatch {
        rect: PixelRect,
        actual_width: u32,
        actual_height: u32,
    },

    /// The image's pixel buffer does not match its dimensions.
    #[error("cannot edit box {rect}: pixel buffer holds {actual} bytes, expected {expected}")]
    MalformedImage {
        rect: PixelRect,
        expected: usize,
        actual: usize,
    },

    /// A rotation angle of infinity or NaN.
    #[error("cannot rotate box {rect}: angle is not a finite number")]
    NonFiniteAngle { rect: PixelRect },
}

/// A rectangle known to lie inside its image and to cover at least one pixel.
///
/// Invariant: `x_min < x_max <= width` and `y_min < y_max <= height` for the
/// image it was validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValidRegion {
    x_min: u32,
    y_min: u32,
    x_max: u32,
    y_max: u32,
}

impl ValidRegion {
    pub fn x_min(&self) -> u32 {
        self.x_min
    }

    pub fn y_min(&self) -> u32 {
        self.y_min
    }

    pub fn x_max(&self) -> u32 {
        self.x_max
    }

    pub fn y_max(&self) -> u32 {
        self.y_max
    }

    pub fn width(&self) -> u32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min
    }

    /// The region as a plain rectangle, for diagnostics.
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(
            self.x_min as i64,
            self.y_min as i64,
            self.x_max as i64,
            self.y_max as i64,
        )
    }

    /// Check that every pixel of the region can be indexed in `image`.
    ///
    /// A region remembers only its corners, not the image it was validated
    /// against, so editors re-check before writing.
    ///
    /// # Errors
    ///
    /// `ExceedsBounds` if the region reaches past `image`, `MalformedImage`
    /// if the image's buffer disagrees with its dimensions.
    pub fn check_fits(&self, image: &DecodedImage) -> Result<(), RegionError> {
        if self.x_max > image.width || self.y_max > image.height {
            return Err(RegionError::ExceedsBounds {
                rect: self.rect(),
                width: image.width,
                height: image.height,
            });
        }
        if !image.has_consistent_buffer() {
            return Err(RegionError::MalformedImage {
                rect: self.rect(),
                expected: image.expected_byte_size(),
                actual: image.byte_size(),
            });
        }
        Ok(())
    }
}

/// Check `rect` against a `width x height` image.
///
/// Checks run in order: negative origin, far edge past the image, then
/// non-positive area. A box whose corners are swapped on both axes has a
/// positive area and passes those checks, yet covers no pixels; it is
/// rejected as [`RegionError::EmptyExtraction`].
///
/// A far edge equal to the image size is valid, since ranges are half-open.
pub fn validate_region(
    rect: PixelRect,
    width: u32,
    height: u32,
) -> Result<ValidRegion, RegionError> {
    if rect.x_min < 0 || rect.y_min < 0 {
        return Err(RegionError::NegativeOrigin { rect });
    }

    if rect.x_max > width as i64 || rect.y_max > height as i64 {
        return Err(RegionError::ExceedsBounds {
            rect,
            width,
            height,
        });
    }

    if rect.area() <= 0 {
        return Err(RegionError::EmptyArea { rect });
    }

    if rect.x_max <= rect.x_min || rect.y_max <= rect.y_min {
        return Err(RegionError::EmptyExtraction { rect });
    }

    // All four coordinates are now within [0, width] / [0, height].
    Ok(ValidRegion {
        x_min: rect.x_min as u32,
        y_min: rect.y_min as u32,
        x_max: rect.x_max as u32,
        y_max: rect.y_max as u32,
    })
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for image dimensions.
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=500, 1u32..=500)
    }

    proptest! {
        /// Property: every rectangle inside the image with positive area is valid.
        #[test]
        fn prop_inside_with_area_is_valid(
            (width, height) in dimensions_strategy(),
            a in 0.0f64..1.0,
            b in 0.0f64..1.0,
            c in 0.0f64..1.0,
            d in 0.0f64..1.0,
        ) {
            let x0 = (a * width as f64) as i64;
            let y0 = (b * height as f64) as i64;
            let x1 = x0 + 1 + (c * (width as i64 - x0 - 1) as f64) as i64;
            let y1 = y0 + 1 + (d * (height as i64 - y0 - 1) as f64) as i64;

            let region = validate_region(PixelRect::new(x0, y0, x1, y1), width, height);
            prop_assert!(region.is_ok(), "{:?}", region);

            let region = region.unwrap();
            prop_assert!(region.x_max() <= width);
            prop_assert!(region.y_max() <= height);
            prop_assert!(region.width() >= 1 && region.height() >= 1);
        }

        /// Property: anything past an edge is invalid.
        #[test]
        fn prop_outside_is_invalid(
            (width, height) in dimensions_strategy(),
            x0 in -1000i64..1000,
            y0 in -1000i64..1000,
            x1 in -1000i64..1000,
            y1 in -1000i64..1000,
        ) {
            prop_assume!(x0 < 0 || y0 < 0 || x1 > width as i64 || y1 > height as i64);

            prop_assert!(validate_region(PixelRect::new(x0, y0, x1, y1), width, height).is_err());
        }
    }
}
