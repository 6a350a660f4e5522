//! # Similarity Module
//!
//! Scores how structurally alike two canonical grayscale images are.
//!
//! ## Score Range
//! | Score | Meaning |
//! |-------|---------|
//! | 1.0   | Identical |
//! | ~0    | Unrelated structure |
//! | < 0   | Anti-correlated (e.g. inverted) |

mod ssim;
mod traits;

pub use ssim::{SsimMetric, DEFAULT_WINDOW};
pub use traits::SimilarityMetric;
