//! Core types for image encoding.

use std::path::Path;

use thiserror::Error;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// The underlying encoder failed
    #[error("{format} encoding failed: {message}")]
    EncodingFailed {
        format: &'static str,
        message: String,
    },
}

/// Default JPEG quality used when writing `.jpg` output.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Output container for an edited image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Baseline JPEG with the given quality (1-100).
    Jpeg { quality: u8 },
}

impl OutputFormat {
    /// Pick a format from the file extension of `path`.
    ///
    /// `.jpg`/`.jpeg` (any case) select JPEG at [`DEFAULT_JPEG_QUALITY`];
    /// everything else, including a missing extension, selects PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg {
                quality: DEFAULT_JPEG_QUALITY,
            },
            _ => OutputFormat::Png,
        }
    }

    /// Replace the JPEG quality; PNG is returned unchanged.
    pub fn with_quality(self, quality: u8) -> Self {
        match self {
            OutputFormat::Jpeg { .. } => OutputFormat::Jpeg { quality },
            OutputFormat::Png => OutputFormat::Png,
        }
    }
}

/// Check that `pixels` describes a non-empty `width x height` RGB image.
pub(crate) fn validate_rgb_buffer(
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}
