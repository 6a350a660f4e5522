//! # Error Module
//!
//! Error types for the image matcher, the risk evaluator and the
//! assessment history.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Distinguish failure from "no match"** - a query that cannot be
//!   decoded is an error, never a `false` result

use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum CanScanError {
    #[error("Matching error: {0}")]
    Match(#[from] MatchError),

    #[error("Evaluation error: {0}")]
    Evaluate(#[from] EvaluateError),

    #[error("History error: {0}")]
    History(#[from] HistoryError),
}

/// Errors that abort an image matcher call
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("Query image {path} could not be decoded: {reason}")]
    QueryDecode { path: PathBuf, reason: String },

    #[error("Corpus is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to enumerate corpus {path}: {source}")]
    CorpusEnumeration {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid threshold: {value} (must be between -1.0 and 1.0)")]
    InvalidThreshold { value: f64 },

    #[error("Invalid canonical resolution: {value} (must be at least the window size {window})")]
    InvalidResolution { value: u32, window: u32 },

    #[error("Invalid window size: {value} (must be odd and at least 3)")]
    InvalidWindow { value: u32 },

    #[error("Similarity computation failed: {0}")]
    Similarity(#[from] SimilarityError),
}

/// Errors that occur while loading a single image
///
/// For corpus candidates these are absorbed and the candidate is skipped.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Failed to decode image {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("Image is empty: {path}")]
    EmptyImage { path: PathBuf },

    #[error("Failed to open image file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to resize image to {width}x{height}: {reason}")]
    Resize {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// Errors from the structural similarity metric
#[derive(Error, Debug)]
pub enum SimilarityError {
    #[error("Images differ in size: {left:?} vs {right:?}")]
    DimensionMismatch {
        left: (u32, u32),
        right: (u32, u32),
    },

    #[error("Image of {width}x{height} is smaller than the {window}x{window} window")]
    ImageTooSmall { width: u32, height: u32, window: u32 },
}

/// Errors at the risk evaluator boundary
#[derive(Error, Debug, PartialEq, Eq)]
pub enum EvaluateError {
    #[error("Invalid symptom count: {value} (must be a non-negative 32-bit count)")]
    InvalidSymptomCount { value: i64 },
}

/// Errors from the assessment history store
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Failed to open history database at {path}: {reason}")]
    OpenFailed { path: PathBuf, reason: String },

    #[error("History query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    #[error("Failed to serialize history data: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("History database lock was poisoned")]
    LockPoisoned,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, CanScanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_decode_error_includes_path() {
        let error = MatchError::QueryDecode {
            path: PathBuf::from("/scans/query.png"),
            reason: "invalid PNG signature".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("/scans/query.png"));
        assert!(message.contains("invalid PNG signature"));
    }

    #[test]
    fn corpus_error_includes_path() {
        let error = MatchError::CorpusEnumeration {
            path: PathBuf::from("/datasets/reference"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(error.to_string().contains("/datasets/reference"));
    }

    #[test]
    fn symptom_count_error_shows_value() {
        let error = EvaluateError::InvalidSymptomCount { value: -2 };
        assert!(error.to_string().contains("-2"));
    }

    #[test]
    fn match_error_converts_to_top_level() {
        let error: CanScanError = MatchError::NotADirectory {
            path: PathBuf::from("/tmp/file.png"),
        }
        .into();
        assert!(matches!(error, CanScanError::Match(_)));
    }
}
