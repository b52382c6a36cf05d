//! Flat-color masking of a region.

use crate::decode::DecodedImage;
use crate::region::{RegionError, ValidRegion};

/// Default fill color, pure red in RGB order.
pub const MASK_RED: [u8; 3] = [255, 0, 0];

/// Overwrite every pixel of `region` with `fill`.
///
/// Covers `[y_min, y_max) x [x_min, x_max)`. Masking the same region twice
/// leaves the image exactly as masking it once.
///
/// # Errors
///
/// Fails without writing if `region` does not fit `image`; see
/// [`ValidRegion::check_fits`].
pub fn apply_mask(
    image: &mut DecodedImage,
    region: &ValidRegion,
    fill: [u8; 3],
) -> Result<(), RegionError> {
    region.check_fits(image)?;

    let row_stride = image.width as usize * 3;
    let start_col = region.x_min() as usize * 3;
    let end_col = region.x_max() as usize * 3;

    for y in region.y_min()..region.y_max() {
        let row_start = y as usize * row_stride;
        let row = &mut image.pixels[row_start + start_col..row_start + end_col];
        for chunk in row.chunks_exact_mut(3) {
            chunk.copy_from_slice(&fill);
        }
    }
    Ok(())
}


// ============================================================================
// Property-Based Tests
// ============================================================================
