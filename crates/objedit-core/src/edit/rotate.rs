//! Rotation of a region's content about its own center.
//!
//! The region is rotated on a canvas of its own size: content that rotates
//! out of the region is dropped and uncovered pixels become black. The pivot
//! is `(width / 2, height / 2)` of the region, using integer division, and
//! positive angles rotate counter-clockwise as seen on screen.
//!
//! # Algorithm
//!
//! Inverse mapping: for each output pixel we compute the source position that
//! lands on it and interpolate there. With `(cx, cy)` the pivot and θ the
//! angle:
//!
//! ```text
//! src_x = (dst_x - cx) * cos(θ) - (dst_y - cy) * sin(θ) + cx
//! src_y = (dst_x - cx) * sin(θ) + (dst_y - cy) * cos(θ) + cy
//! ```
//!
//! Pixel centers sit on integer coordinates. Samples outside the source read
//! as black.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::patch::{extract_region, write_region};
use crate::decode::DecodedImage;
use crate::region::{RegionError, ValidRegion};

/// Angles closer than this to a multiple of 90 degrees snap to it.
const ANGLE_EPSILON: f64 = 0.001;

/// Interpolation filter for rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationFilter {
    /// Nearest neighbor - blocky, but never invents colors.
    Nearest,
    /// Bilinear interpolation over the 2x2 neighborhood.
    #[default]
    Bilinear,
    /// Lanczos3 over a 6x6 neighborhood - sharper, slower.
    Lanczos3,
}

impl fmt::Display for InterpolationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InterpolationFilter::Nearest => "nearest",
            InterpolationFilter::Bilinear => "bilinear",
            InterpolationFilter::Lanczos3 => "lanczos3",
        };
        f.write_str(name)
    }
}

impl FromStr for InterpolationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(InterpolationFilter::Nearest),
            "bilinear" => Ok(InterpolationFilter::Bilinear),
            "lanczos3" | "lanczos" => Ok(InterpolationFilter::Lanczos3),
            other => Err(format!(
                "unknown filter '{other}' (expected nearest, bilinear or lanczos3)"
            )),
        }
    }
}

/// True if `angle_degrees` is a whole number of turns.
pub fn is_identity_angle(angle_degrees: f64) -> bool {
    let normalized = angle_degrees % 360.0;
    normalized.abs() < ANGLE_EPSILON || (360.0 - normalized.abs()).abs() < ANGLE_EPSILON
}

/// `(sin θ, cos θ)`, exact for quarter turns.
///
/// `f64::to_radians(90.0).cos()` is about `6e-17`, not zero; snapping keeps
/// quarter-turn rotations pixel-exact.
fn rotation_sin_cos(angle_degrees: f64) -> (f64, f64) {
    let quarters = angle_degrees / 90.0;
    let nearest = quarters.round();
    if (quarters - nearest).abs() * 90.0 < ANGLE_EPSILON {
        return match (nearest as i64).rem_euclid(4) {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        };
    }
    angle_degrees.to_radians().sin_cos()
}

/// Rotate `patch` about its pivot on a canvas of the same size.
///
/// A whole number of turns returns the patch unchanged, bit for bit.
/// `angle_degrees` must be finite; callers check it.
pub(crate) fn rotate_patch(
    patch: &DecodedImage,
    angle_degrees: f64,
    filter: InterpolationFilter,
) -> DecodedImage {
    // Fast path: no rotation needed
    if is_identity_angle(angle_degrees) || patch.is_empty() {
        return patch.clone();
    }

    let (width, height) = (patch.width, patch.height);
    let (sin, cos) = rotation_sin_cos(angle_degrees);

    // Pivot uses integer division, so even sizes pivot right/below the middle
    let cx = (width / 2) as f64;
    let cy = (height / 2) as f64;

    let mut output = vec![0u8; patch.pixels.len()];

    for dst_y in 0..height {
        for dst_x in 0..width {
            let dx = dst_x as f64 - cx;
            let dy = dst_y as f64 - cy;

            let src_x = dx * cos - dy * sin + cx;
            let src_y = dx * sin + dy * cos + cy;

            let pixel = match filter {
                InterpolationFilter::Nearest => sample_nearest(patch, src_x, src_y),
                InterpolationFilter::Bilinear => sample_bilinear(patch, src_x, src_y),
                InterpolationFilter::Lanczos3 => sample_lanczos3(patch, src_x, src_y),
            };

            let dst_idx = patch.pixel_index(dst_x, dst_y);
            output[dst_idx..dst_idx + 3].copy_from_slice(&pixel);
        }
    }

    DecodedImage {
        width,
        height,
        pixels: output,
    }
}

/// Rotate the content of `region` in place.
///
/// Each call rotates the region's current content, so two calls with θ give
/// (up to resampling loss) a 2θ rotation of the original.
///
/// # Errors
///
/// - `RegionError::NonFiniteAngle` if the angle is infinite or NaN
/// - `ExceedsBounds` / `MalformedImage` if `region` does not fit `image`
/// - `RegionError::EmptyExtraction` if the region yields no pixels
///
/// The image is untouched on error.
pub fn apply_region_rotation(
    image: &mut DecodedImage,
    region: &ValidRegion,
    angle_degrees: f64,
    filter: InterpolationFilter,
) -> Result<(), RegionError> {
    if !angle_degrees.is_finite() {
        return Err(RegionError::NonFiniteAngle {
            rect: region.rect(),
        });
    }
    region.check_fits(image)?;

    let patch = extract_region(image, region);
    if patch.is_empty() {
        return Err(RegionError::EmptyExtraction {
            rect: region.rect(),
        });
    }

    let rotated = rotate_patch(&patch, angle_degrees, filter);
    write_region(image, region, &rotated)
}

/// Get a pixel as [f64; 3], or black when outside the image.
#[inline]
fn get_pixel_f64(image: &DecodedImage, px: i64, py: i64) -> [f64; 3] {
    if px < 0 || py < 0 || px >= image.width as i64 || py >= image.height as i64 {
        return [0.0; 3];
    }
    let [r, g, b] = image.pixel(px as u32, py as u32);
    [r as f64, g as f64, b as f64]
}

fn sample_nearest(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let [r, g, b] = get_pixel_f64(image, x.round() as i64, y.round() as i64);
    [r as u8, g as u8, b as u8]
}

/// Sample a pixel using bilinear interpolation.
///
/// Neighbors outside the image count as black, so edges fade into the
/// background instead of being cut off.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as f64, image.height as f64);

    // Entirely outside, including the one-pixel fade band
    if x <= -1.0 || x >= w || y <= -1.0 || y >= h {
        return [0, 0, 0];
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let x1 = x0 + 1;
    let y1 = y0 + 1;

    // Fractional distances
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Sample a pixel using Lanczos3 interpolation.
///
/// Falls back to bilinear where the 6x6 kernel would leave the image.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as i64, image.height as i64);

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;

            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);
            let pixel = get_pixel_f64(image, px, py);
            sum[0] += pixel[0] * weight;
            sum[1] += pixel[1] * weight;
            sum[2] += pixel[2] * weight;
            weight_sum += weight;
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    result
}

/// Lanczos kernel weight function.
///
/// ```text
/// L(x) = sinc(x) * sinc(x/a)  for |x| < a
/// L(x) = 0                     for |x| >= a
/// ```
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    let pi_x_a = pi_x / a;

    (a * pi_x.sin() * pi_x_a.sin()) / (pi_x * pi_x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{validate_region, PixelRect};

    /// Image where each pixel has a unique value based on position.
    fn test_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((y * width + x) % 251) as u8;
                pixels.extend_from_slice(&[v, 255 - v, (x * 7 % 256) as u8]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    /// Smooth linear gradient; bilinear resampling reproduces it almost exactly.
    fn gradient_image(width: u32, height: u32) -> DecodedImage {
        let mut pixels = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[(x * 3) as u8, (y * 2) as u8, (x + y) as u8]);
            }
        }
        DecodedImage::new(width, height, pixels)
    }

    #[test]
    fn test_no_rotation_is_bit_exact() {
        let img = test_image(31, 17);
        for filter in [
            InterpolationFilter::Nearest,
            InterpolationFilter::Bilinear,
            InterpolationFilter::Lanczos3,
        ] {
            assert_eq!(rotate_patch(&img, 0.0, filter), img);
        }
    }

    #[test]
    fn test_full_turns_are_bit_exact() {
        let img = test_image(20, 12);
        for angle in [360.0, -360.0, 720.0, 0.0001, 359.9999] {
            assert_eq!(
                rotate_patch(&img, angle, InterpolationFilter::Bilinear),
                img,
                "angle {angle}"
            );
        }
    }

    #[test]
    fn test_is_identity_angle() {
        assert!(is_identity_angle(0.0));
        assert!(is_identity_angle(-720.0));
        assert!(!is_identity_angle(90.0));
        assert!(!is_identity_angle(1.0));
    }

    #[test]
    fn test_rotation_sin_cos_snaps_quarter_turns() {
        assert_eq!(rotation_sin_cos(90.0), (1.0, 0.0));
        assert_eq!(rotation_sin_cos(180.0), (0.0, -1.0));
        assert_eq!(rotation_sin_cos(-90.0), (-1.0, 0.0));
        assert_eq!(rotation_sin_cos(450.0), (1.0, 0.0));

        let (sin, cos) = rotation_sin_cos(30.0);
        assert!((sin - 0.5).abs() < 1e-12);
        assert!((cos - 3f64.sqrt() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_keeps_dimensions() {
        let img = test_image(40, 25);
        let result = rotate_patch(&img, 45.0, InterpolationFilter::Bilinear);
        assert_eq!(result.width, 40);
        assert_eq!(result.height, 25);
        assert_eq!(result.byte_size(), img.byte_size());
    }

    #[test]
    fn test_quarter_turn_counter_clockwise() {
        // 30x30, pivot (15, 15)
        let img = test_image(30, 30);
        let result = rotate_patch(&img, 90.0, InterpolationFilter::Bilinear);

        // Source (1, 0) near the top-left lands on (0, 29), the bottom-left
        assert_eq!(result.pixel(0, 29), img.pixel(1, 0));
        // Source (29, 1) near the top-right lands on (1, 1), the top-left
        assert_eq!(result.pixel(1, 1), img.pixel(29, 1));
        // The pivot stays put
        assert_eq!(result.pixel(15, 15), img.pixel(15, 15));
    }

    #[test]
    fn test_quarter_turn_exposes_background() {
        let img = DecodedImage::filled(30, 30, [200, 200, 200]);
        let result = rotate_patch(&img, 90.0, InterpolationFilter::Bilinear);

        // Output row 0 samples source column 30, one past the edge
        assert_eq!(result.pixel(10, 0), [0, 0, 0]);
        assert_eq!(result.pixel(10, 1), [200, 200, 200]);
    }

    #[test]
    fn test_half_turn_on_odd_square_is_point_reflection() {
        let img = test_image(5, 5);
        let result = rotate_patch(&img, 180.0, InterpolationFilter::Bilinear);

        for y in 0..5 {
            for x in 0..5 {
                assert_eq!(result.pixel(x, y), img.pixel(4 - x, 4 - y));
            }
        }
    }

    #[test]
    fn test_nearest_never_invents_colors() {
        let mut img = DecodedImage::filled(21, 21, [10, 20, 30]);
        img.set_pixel(3, 3, [250, 240, 230]);
        let result = rotate_patch(&img, 33.0, InterpolationFilter::Nearest);

        for chunk in result.pixels.chunks_exact(3) {
            assert!(
                chunk == [10, 20, 30] || chunk == [250, 240, 230] || chunk == [0, 0, 0],
                "unexpected color {:?}",
                chunk
            );
        }
    }

    #[test]
    fn test_45_degree_rotation_blackens_corners() {
        let img = DecodedImage::filled(40, 40, [255, 255, 255]);
        let result = rotate_patch(&img, 45.0, InterpolationFilter::Bilinear);

        assert_eq!(result.pixel(0, 0), [0, 0, 0]);
        assert_eq!(result.pixel(39, 39), [0, 0, 0]);
        assert_eq!(result.pixel(20, 20), [255, 255, 255]);
    }

    #[test]
    fn test_rotation_then_inverse_restores_interior() {
        let img = gradient_image(40, 40);
        let forward = rotate_patch(&img, 30.0, InterpolationFilter::Bilinear);
        let back = rotate_patch(&forward, -30.0, InterpolationFilter::Bilinear);

        // Pixels within radius 14 of the pivot never leave the canvas
        for y in 0..40u32 {
            for x in 0..40u32 {
                let (dx, dy) = (x as f64 - 20.0, y as f64 - 20.0);
                if dx * dx + dy * dy > 14.0 * 14.0 {
                    continue;
                }
                let (a, b) = (img.pixel(x, y), back.pixel(x, y));
                for c in 0..3 {
                    assert!(
                        (a[c] as i32 - b[c] as i32).abs() <= 3,
                        "({x}, {y}) channel {c}: {} vs {}",
                        a[c],
                        b[c]
                    );
                }
            }
        }
    }

    #[test]
    fn test_repeated_rotation_composes() {
        let img = gradient_image(41, 41);
        let twice = rotate_patch(
            &rotate_patch(&img, 45.0, InterpolationFilter::Bilinear),
            45.0,
            InterpolationFilter::Bilinear,
        );
        let once = rotate_patch(&img, 90.0, InterpolationFilter::Bilinear);

        for y in 10..31 {
            for x in 10..31 {
                let (a, b) = (once.pixel(x, y), twice.pixel(x, y));
                for c in 0..3 {
                    assert!((a[c] as i32 - b[c] as i32).abs() <= 3, "({x}, {y})");
                }
            }
        }
        // And it really did rotate: the result differs from the source
        assert_ne!(twice, img);
    }

    #[test]
    fn test_lanczos_matches_bilinear_on_flat_image() {
        let img = DecodedImage::filled(30, 30, [90, 90, 90]);
        let lanczos = rotate_patch(&img, 15.0, InterpolationFilter::Lanczos3);

        // Interior pixels of a flat image stay flat
        assert_eq!(lanczos.pixel(15, 15), [90, 90, 90]);
        assert_eq!(lanczos.pixel(12, 18), [90, 90, 90]);
    }

    #[test]
    fn test_small_images_do_not_panic() {
        for (w, h) in [(1, 1), (2, 1), (1, 9), (100, 1), (4, 4)] {
            let img = test_image(w, h);
            for filter in [
                InterpolationFilter::Nearest,
                InterpolationFilter::Bilinear,
                InterpolationFilter::Lanczos3,
            ] {
                let result = rotate_patch(&img, 37.0, filter);
                assert_eq!((result.width, result.height), (w, h));
            }
        }
    }

    #[test]
    fn test_apply_region_rotation_only_touches_region() {
        let mut img = test_image(50, 50);
        let original = img.clone();
        let region = validate_region(PixelRect::new(10, 10, 40, 40), 50, 50).unwrap();

        apply_region_rotation(&mut img, &region, 90.0, InterpolationFilter::Bilinear).unwrap();

        for y in 0..50 {
            for x in 0..50 {
                if !((10..40).contains(&x) && (10..40).contains(&y)) {
                    assert_eq!(img.pixel(x, y), original.pixel(x, y));
                }
            }
        }
        // Region-local (1, 0) -> (0, 29), i.e. image (11, 10) -> (10, 39)
        assert_eq!(img.pixel(10, 39), original.pixel(11, 10));
    }

    #[test]
    fn test_apply_region_rotation_rejects_non_finite_angle() {
        let original = DecodedImage::filled(100, 100, [200, 200, 200]);
        let region = validate_region(PixelRect::new(10, 10, 40, 40), 100, 100).unwrap();

        for angle in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let mut img = original.clone();
            let result =
                apply_region_rotation(&mut img, &region, angle, InterpolationFilter::Bilinear);

            assert_eq!(
                result,
                Err(RegionError::NonFiniteAngle {
                    rect: PixelRect::new(10, 10, 40, 40)
                })
            );
            // Nothing was blacked out
            assert_eq!(img, original);
        }
    }

    #[test]
    fn test_apply_region_rotation_rejects_region_from_larger_image() {
        let region = validate_region(PixelRect::new(10, 10, 40, 40), 100, 100).unwrap();
        let original = test_image(20, 20);
        let mut img = original.clone();

        let result = apply_region_rotation(&mut img, &region, 45.0, InterpolationFilter::Nearest);

        assert!(matches!(result, Err(RegionError::ExceedsBounds { .. })));
        assert_eq!(img, original);
    }

    #[test]
    fn test_lanczos_weight_at_zero() {
        let w = lanczos_weight(0.0, 3.0);
        assert!((w - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_at_boundary() {
        let w = lanczos_weight(3.0, 3.0);
        assert!(w.abs() < f64::EPSILON);
    }

    #[test]
    fn test_lanczos_weight_symmetry() {
        let w1 = lanczos_weight(1.5, 3.0);
        let w2 = lanczos_weight(-1.5, 3.0);
        assert!((w1 - w2).abs() < 1e-10);
    }

    #[test]
    fn test_filter_parse_and_display() {
        assert_eq!(
            "Bilinear".parse::<InterpolationFilter>(),
            Ok(InterpolationFilter::Bilinear)
        );
        assert_eq!(
            "lanczos".parse::<InterpolationFilter>(),
            Ok(InterpolationFilter::Lanczos3)
        );
        assert!("cubic".parse::<InterpolationFilter>().is_err());
        assert_eq!(InterpolationFilter::Nearest.to_string(), "nearest");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
