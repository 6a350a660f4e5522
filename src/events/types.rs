//! Event type definitions for progress reporting.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All events emitted by the core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// Corpus scan events
    Match(MatchEvent),
}

/// Events emitted while a query is compared against a corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MatchEvent {
    /// The corpus scan has started
    Started { query: PathBuf, corpus: PathBuf },
    /// A candidate was decoded and scored below the threshold
    CandidateCompared { path: PathBuf, score: f64 },
    /// A candidate could not be decoded and was skipped
    CandidateSkipped { path: PathBuf, reason: String },
    /// A candidate met the threshold; the scan stops here
    MatchFound { path: PathBuf, score: f64 },
    /// The scan finished
    Completed(ScanSummary),
}

/// Counters reported when a scan finishes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Candidates that were decoded and scored
    pub compared: usize,
    /// Candidates that failed to decode
    pub skipped: usize,
    /// Whether any candidate met the threshold
    pub matched: bool,
    /// Duration in milliseconds
    pub duration_ms: u64,
}
