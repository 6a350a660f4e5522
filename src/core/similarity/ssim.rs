//! Mean structural similarity (SSIM).
//!
//! Local statistics use a uniform square window and sample covariance.
//! Only windows lying fully inside the image contribute to the mean, so
//! no border padding mode is involved.

use super::traits::{ensure_same_dimensions, SimilarityMetric};
use crate::error::SimilarityError;
use image::GrayImage;

/// Default side length of the sliding window
pub const DEFAULT_WINDOW: u32 = 7;

/// Luminance stabilizer constant
const K1: f64 = 0.01;
/// Contrast stabilizer constant
const K2: f64 = 0.03;
/// Dynamic range of 8-bit samples
const DATA_RANGE: f64 = 255.0;

/// Structural similarity metric for 8-bit grayscale images
#[derive(Debug, Clone)]
pub struct SsimMetric {
    window: u32,
}

impl SsimMetric {
    /// Create a metric with the given (odd) window size
    pub fn new(window: u32) -> Self {
        Self { window }
    }
}

impl Default for SsimMetric {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl SimilarityMetric for SsimMetric {
    fn score(&self, left: &GrayImage, right: &GrayImage) -> Result<f64, SimilarityError> {
        ensure_same_dimensions(left, right)?;

        let (width, height) = left.dimensions();
        let window = self.window;
        if window < 2 || width < window || height < window {
            return Err(SimilarityError::ImageTooSmall {
                width,
                height,
                window,
            });
        }

        let a = left.as_raw();
        let b = right.as_raw();
        let w = width as usize;
        let h = height as usize;

        let sum_a = SummedArea::build(w, h, |i| a[i] as u64);
        let sum_b = SummedArea::build(w, h, |i| b[i] as u64);
        let sum_aa = SummedArea::build(w, h, |i| a[i] as u64 * a[i] as u64);
        let sum_bb = SummedArea::build(w, h, |i| b[i] as u64 * b[i] as u64);
        let sum_ab = SummedArea::build(w, h, |i| a[i] as u64 * b[i] as u64);

        let win = window as usize;
        let n = (win * win) as f64;
        let cov_norm = n / (n - 1.0);
        let c1 = (K1 * DATA_RANGE).powi(2);
        let c2 = (K2 * DATA_RANGE).powi(2);

        let mut total = 0.0;
        let mut count = 0usize;

        for y in 0..=(h - win) {
            for x in 0..=(w - win) {
                let ux = sum_a.window(x, y, win) as f64 / n;
                let uy = sum_b.window(x, y, win) as f64 / n;
                let uxx = sum_aa.window(x, y, win) as f64 / n;
                let uyy = sum_bb.window(x, y, win) as f64 / n;
                let uxy = sum_ab.window(x, y, win) as f64 / n;

                let vx = cov_norm * (uxx - ux * ux);
                let vy = cov_norm * (uyy - uy * uy);
                let vxy = cov_norm * (uxy - ux * uy);

                let numerator = (2.0 * ux * uy + c1) * (2.0 * vxy + c2);
                let denominator = (ux * ux + uy * uy + c1) * (vx + vy + c2);

                total += numerator / denominator;
                count += 1;
            }
        }

        Ok(total / count as f64)
    }

    fn description(&self) -> String {
        format!("Mean SSIM over a {}x{} uniform window", self.window, self.window)
    }
}

/// Integral image with a zero row and column in front
struct SummedArea {
    stride: usize,
    data: Vec<u64>,
}

impl SummedArea {
    fn build(width: usize, height: usize, value: impl Fn(usize) -> u64) -> Self {
        let stride = width + 1;
        let mut data = vec![0u64; stride * (height + 1)];

        for y in 0..height {
            let mut row = 0u64;
            for x in 0..width {
                row += value(y * width + x);
                data[(y + 1) * stride + x + 1] = data[y * stride + x + 1] + row;
            }
        }

        Self { stride, data }
    }

    /// Sum of the `size` x `size` block whose top-left corner is (x, y)
    fn window(&self, x: usize, y: usize, size: usize) -> u64 {
        let s = self.stride;
        let (x1, y1) = (x + size, y + size);
        self.data[y1 * s + x1] + self.data[y * s + x] - self.data[y * s + x1] - self.data[y1 * s + x]
    }
}
