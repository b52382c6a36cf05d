//! Image encoding for objedit.
//!
//! This module provides functionality for:
//! - Encoding images to PNG (lossless, default)
//! - Encoding images to JPEG with configurable quality
//!
//! Pixels are written in RGB order, the same order the edit pipeline uses in
//! memory, so a masked region is red in the saved file.
//!
//! # Examples
//!
//! ```ignore
//! use objedit_core::encode::{encode_image, OutputFormat};
//!
//! let bytes = encode_image(&image, OutputFormat::from_path("out.png".as_ref())).unwrap();
//! std::fs::write("out.png", bytes).unwrap();
//! ```

mod jpeg;
mod png;
mod types;

pub use jpeg::encode_jpeg;
pub use png::encode_png;
pub use types::{EncodeError, OutputFormat, DEFAULT_JPEG_QUALITY};

use crate::decode::DecodedImage;

/// Encode a decoded image in the given container format.
pub fn encode_image(image: &DecodedImage, format: OutputFormat) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Png => encode_png(&image.pixels, image.width, image.height),
        OutputFormat::Jpeg { quality } => {
            encode_jpeg(&image.pixels, image.width, image.height, quality)
        }
    }
}
