//! Image decoding for objedit.
//!
//! Turns encoded image bytes into a [`DecodedImage`], the in-memory RGB
//! buffer the edit pipeline mutates. Reading the bytes from disk is left to
//! the caller.
//!
//! # Examples
//!
//! ```ignore
//! use objedit_core::decode::decode_image;
//!
//! let bytes = std::fs::read("street.png").unwrap();
//! let image = decode_image(&bytes).unwrap();
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod reader;
mod types;

pub use reader::decode_image;
pub use types::{DecodeError, DecodedImage};
