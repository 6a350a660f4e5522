//! # Core Module
//!
//! The front-end agnostic assessment engine.
//!
//! ## Modules
//! - `imaging` - Decodes images and normalizes them to the comparison grid
//! - `similarity` - Structural similarity scoring
//! - `corpus` - Enumerates reference images
//! - `matcher` - Scans a corpus for a structural match
//! - `risk` - Combines match and symptoms into a risk tier
//! - `history` - Persists completed assessments

pub mod corpus;
pub mod history;
pub mod imaging;
pub mod matcher;
pub mod risk;
pub mod similarity;

// Re-export commonly used types
pub use matcher::{find_match, ImageMatcher, MatchReport, MatcherConfig};
pub use risk::{evaluate, RiskTier, SymptomCount};
