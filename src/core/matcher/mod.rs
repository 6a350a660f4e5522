//! # Matcher Module
//!
//! Decides whether a query image structurally matches any image in a
//! reference corpus.
//!
//! ## How It Works
//! 1. Decode the query, convert to grayscale, resize to the canonical grid
//! 2. Walk the corpus directory (first match wins, order unspecified)
//! 3. Decode and normalize each candidate the same way; skip those that
//!    fail to decode
//! 4. Score with SSIM and stop at the first score >= threshold
//!
//! ## Example
//! ```rust,ignore
//! use canscan_lite::core::matcher::MatcherConfig;
//!
//! let matcher = MatcherConfig::new().threshold(0.9).build()?;
//! let matched = matcher.find_match(&query, &corpus)?;
//! ```

mod config;
mod executor;

pub use config::{MatcherConfig, DEFAULT_RESOLUTION, DEFAULT_THRESHOLD};
pub use executor::{CandidateMatch, ImageMatcher, MatchReport};

use crate::error::MatchError;
use std::path::Path;

/// One-off match with the default resolution and a custom threshold.
///
/// A threshold outside [-1.0, 1.0] (or NaN) is rejected with
/// [`MatchError::InvalidThreshold`] before anything is read, rather than
/// reported as "no match".
pub fn find_match(query: &Path, corpus: &Path, threshold: f64) -> Result<bool, MatchError> {
    MatcherConfig::new()
        .threshold(threshold)
        .build()?
        .find_match(query, corpus)
}
