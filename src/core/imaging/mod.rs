//! # Imaging Module
//!
//! Turns image files into the canonical representation used for
//! comparison: 8-bit grayscale, square, fixed resolution.
//!
//! ## Performance
//! - Uses `zune-jpeg` for faster JPEG decoding
//! - Uses `fast_image_resize` for SIMD-accelerated resizing

pub mod decode;
pub mod resize;

pub use decode::{FastDecoder, ImageFormat};
pub use resize::CanonicalResizer;

use crate::error::DecodeError;
use image::GrayImage;
use std::path::Path;

/// Decode a file and normalize it with the given resizer
pub fn load_canonical(path: &Path, resizer: &mut CanonicalResizer) -> Result<GrayImage, DecodeError> {
    let image = FastDecoder::decode(path)?;
    resizer.normalize(&image)
}
