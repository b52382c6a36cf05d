//! Copying a region out of an image and back in.

use crate::decode::DecodedImage;
use crate::region::{RegionError, ValidRegion};

/// Copy the pixels of `region` into a new image of the region's size.
pub fn extract_region(image: &DecodedImage, region: &ValidRegion) -> DecodedImage {
    let out_width = region.width();
    let out_height = region.height();
    let row_bytes = out_width as usize * 3;

    let mut output = Vec::with_capacity(row_bytes * out_height as usize);

    // Copy pixel data row by row
    for y in region.y_min()..region.y_max() {
        let src_start = image.pixel_index(region.x_min(), y);
        output.extend_from_slice(&image.pixels[src_start..src_start + row_bytes]);
    }

    DecodedImage {
        width: out_width,
        height: out_height,
        pixels: output,
    }
}

/// Overwrite `region` of `image` with `patch`.
///
/// # Errors
///
/// Returns `RegionError::PatchSizeMismatch` if the patch dimensions differ from
/// the region's; the image is left untouched in that case.
pub fn write_region(
    image: &mut DecodedImage,
    region: &ValidRegion,
    patch: &DecodedImage,
) -> Result<(), RegionError> {
    if patch.width != region.width() || patch.height != region.height() {
        return Err(RegionError::PatchSizeMismatch {
            rect: region.rect(),
            actual_width: patch.width,
            actual_height: patch.height,
        });
    }

    let row_bytes = patch.width as usize * 3;
    for (row, y) in (region.y_min()..region.y_max()).enumerate() {
        let dst_start = image.pixel_index(region.x_min(), y);
        let src_start = row * row_bytes;
        image.pixels[dst_start..dst_start + row_bytes]
            .copy_from_slice(&patch.pixels[src_start..src_start + row_bytes]);
    }
    Ok(())
}
