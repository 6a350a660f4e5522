//! Trait definitions for similarity metrics.

use crate::error::SimilarityError;
use image::GrayImage;

/// A metric comparing two equally sized grayscale images
pub trait SimilarityMetric: Send + Sync {
    /// Score the pair.
    ///
    /// Higher means more similar; identical inputs score the metric's
    /// maximum. Inputs of different dimensions are an error.
    fn score(&self, left: &GrayImage, right: &GrayImage) -> Result<f64, SimilarityError>;

    /// Human-readable description of the metric
    fn description(&self) -> String;
}

/// Reject pairs that were not normalized to the same grid
pub(crate) fn ensure_same_dimensions(left: &GrayImage, right: &GrayImage) -> Result<(), SimilarityError> {
    if left.dimensions() != right.dimensions() {
        return Err(SimilarityError::DimensionMismatch {
            left: left.dimensions(),
            right: right.dimensions(),
        });
    }
    Ok(())
}
