//! Matcher configuration.

use super::ImageMatcher;
use crate::core::similarity::{SimilarityMetric, SsimMetric, DEFAULT_WINDOW};
use crate::error::MatchError;
use serde::{Deserialize, Serialize};

/// Minimum similarity for a candidate to count as a match
pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// Side length of the canonical comparison grid
pub const DEFAULT_RESOLUTION: u32 = 256;

/// Configuration builder for the image matcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Scores at or above this value are matches
    pub threshold: f64,
    /// Images are resized to `resolution` x `resolution` before comparison
    pub resolution: u32,
    /// SSIM window side length (odd)
    pub window: u32,
}

impl MatcherConfig {
    /// Create a configuration with the default threshold and resolution
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            resolution: DEFAULT_RESOLUTION,
            window: DEFAULT_WINDOW,
        }
    }

    /// Set the match threshold
    ///
    /// Lowering the threshold can only turn non-matches into matches.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the canonical resolution
    pub fn resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    /// Set the SSIM window size
    pub fn window(mut self, window: u32) -> Self {
        self.window = window;
        self
    }

    /// Check that the values describe a usable matcher
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(-1.0..=1.0).contains(&self.threshold) {
            return Err(MatchError::InvalidThreshold {
                value: self.threshold,
            });
        }
        if self.window < 3 || self.window % 2 == 0 {
            return Err(MatchError::InvalidWindow { value: self.window });
        }
        if self.resolution < self.window {
            return Err(MatchError::InvalidResolution {
                value: self.resolution,
                window: self.window,
            });
        }
        Ok(())
    }

    /// Build a matcher scoring with SSIM
    pub fn build(self) -> Result<ImageMatcher, MatchError> {
        let metric = SsimMetric::new(self.window);
        self.build_with_metric(Box::new(metric))
    }

    /// Build a matcher scoring with a custom metric
    pub fn build_with_metric(self, metric: Box<dyn SimilarityMetric>) -> Result<ImageMatcher, MatchError> {
        self.validate()?;
        Ok(ImageMatcher::from_parts(self, metric))
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self::new()
    }
}
