//! # CanScan Lite
//!
//! Checks whether a medical image structurally matches any image in a
//! reference corpus, and combines that signal with a symptom checklist
//! into a risk tier.
//!
//! ## Architecture
//! The library is split into a core engine and presentation layers:
//! - `core` - Image matching and risk evaluation
//! - `events` - Progress reporting over channels
//! - `error` - Error types
//!
//! The `canscan` binary is one presentation layer. It owns the symptom
//! checklist and how tiers are labelled; the core only sees counts.
//!
//! ## Example
//! ```rust,ignore
//! use canscan_lite::core::{evaluate, ImageMatcher};
//!
//! let image_match = ImageMatcher::new().find_match(&query, &corpus)?;
//! let tier = evaluate(image_match, 4);
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{CanScanError, Result};

/// Initialize tracing for the library
///
/// This should be called by the application entry point.
pub fn init_tracing() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed (e.g. by an embedding app)
    let _ = tracing::subscriber::set_global_default(subscriber);
}
