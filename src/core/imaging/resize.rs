//! SIMD-accelerated resizing to the canonical comparison grid.
//!
//! Uses fast_image_resize, which picks AVX2/NEON when available.
//! The filter is fixed (bilinear convolution) so a query and its
//! candidates always go through the same resampling.

use crate::error::DecodeError;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};

/// Converts images to square grayscale grids of a fixed resolution
pub struct CanonicalResizer {
    resizer: Resizer,
    resolution: u32,
}

impl CanonicalResizer {
    /// Create a resizer producing `resolution` x `resolution` grids
    pub fn new(resolution: u32) -> Self {
        Self {
            resizer: Resizer::new(),
            resolution,
        }
    }

    /// Convert to 8-bit grayscale and resize to the canonical resolution.
    ///
    /// Aspect ratio is not preserved; every image is stretched onto the
    /// same square grid.
    pub fn normalize(&mut self, image: &DynamicImage) -> Result<GrayImage, DecodeError> {
        // Grayscale first: resizing one channel is cheaper than three
        let gray = image.to_luma8();
        let (src_width, src_height) = gray.dimensions();
        let size = self.resolution;

        let resize_error = |reason: String| DecodeError::Resize {
            width: size,
            height: size,
            reason,
        };

        if src_width == 0 || src_height == 0 {
            return Err(resize_error("Invalid source dimensions".to_string()));
        }
        if size == 0 {
            return Err(resize_error("Invalid destination dimensions".to_string()));
        }
        if (src_width, src_height) == (size, size) {
            return Ok(gray);
        }

        let src_image = Image::from_vec_u8(src_width, src_height, gray.into_raw(), PixelType::U8)
            .map_err(|e| resize_error(format!("Failed to create source image: {}", e)))?;
        let mut dst_image = Image::new(size, size, PixelType::U8);

        let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

        self.resizer
            .resize(&src_image, &mut dst_image, &options)
            .map_err(|e| resize_error(format!("Resize failed: {}", e)))?;

        let result: ImageBuffer<Luma<u8>, Vec<u8>> =
            ImageBuffer::from_raw(size, size, dst_image.into_vec())
                .ok_or_else(|| resize_error("Failed to create result buffer".to_string()))?;

        Ok(result)
    }
}
