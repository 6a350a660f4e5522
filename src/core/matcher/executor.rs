//! Corpus scan implementation.

use super::MatcherConfig;
use crate::core::corpus::Corpus;
use crate::core::imaging::{load_canonical, CanonicalResizer};
use crate::core::similarity::{SimilarityMetric, SsimMetric};
use crate::error::MatchError;
use crate::events::{null_sender, Event, EventSender, MatchEvent, ScanSummary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// The first corpus member that met the threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatch {
    /// Path of the matching corpus file
    pub path: PathBuf,
    /// Its similarity to the query
    pub score: f64,
}

/// Outcome of one corpus scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// First candidate at or above the threshold, if any.
    ///
    /// Not necessarily the best match: the scan stops at the first hit.
    pub matched: Option<CandidateMatch>,
    /// Threshold the scan ran with
    pub threshold: f64,
    /// Candidates decoded and scored
    pub compared: usize,
    /// Candidates that failed to decode
    pub skipped: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl MatchReport {
    /// Whether any corpus member met the threshold
    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

/// Compares a query image against a corpus directory
pub struct ImageMatcher {
    config: MatcherConfig,
    metric: Box<dyn SimilarityMetric>,
}

impl ImageMatcher {
    pub(super) fn from_parts(config: MatcherConfig, metric: Box<dyn SimilarityMetric>) -> Self {
        Self { config, metric }
    }

    /// Create a matcher with default configuration
    pub fn new() -> Self {
        let config = MatcherConfig::new();
        let metric = SsimMetric::new(config.window);
        Self::from_parts(config, Box::new(metric))
    }

    /// Whether any file in `corpus` is structurally similar to `query`
    pub fn find_match(&self, query: &Path, corpus: &Path) -> Result<bool, MatchError> {
        self.scan(query, corpus).map(|report| report.is_match())
    }

    /// Scan without progress reporting
    pub fn scan(&self, query: &Path, corpus: &Path) -> Result<MatchReport, MatchError> {
        self.scan_with_events(query, corpus, &null_sender())
    }

    /// Scan the corpus, stopping at the first candidate that meets the
    /// threshold.
    ///
    /// Candidates that fail to decode are skipped. The query failing to
    /// decode, or the corpus failing to list, aborts the scan.
    pub fn scan_with_events(
        &self,
        query: &Path,
        corpus: &Path,
        events: &EventSender,
    ) -> Result<MatchReport, MatchError> {
        let start_time = Instant::now();
        let mut resizer = CanonicalResizer::new(self.config.resolution);

        let query_image =
            load_canonical(query, &mut resizer).map_err(|e| MatchError::QueryDecode {
                path: query.to_path_buf(),
                reason: e.to_string(),
            })?;

        let corpus = Corpus::open(corpus)?;
        tracing::info!(
            "Scanning corpus {} with {}, threshold {}",
            corpus.root().display(),
            self.metric.description(),
            self.config.threshold
        );

        events.send(Event::Match(MatchEvent::Started {
            query: query.to_path_buf(),
            corpus: corpus.root().to_path_buf(),
        }));

        let mut compared = 0;
        let mut skipped = 0;
        let mut matched = None;

        for candidate in corpus.candidates() {
            let path = candidate?;

            let candidate_image = match load_canonical(&path, &mut resizer) {
                Ok(image) => image,
                Err(e) => {
                    tracing::debug!("Skipping undecodable candidate {}: {}", path.display(), e);
                    skipped += 1;
                    events.send(Event::Match(MatchEvent::CandidateSkipped {
                        path,
                        reason: e.to_string(),
                    }));
                    continue;
                }
            };

            let score = self.metric.score(&query_image, &candidate_image)?;
            compared += 1;

            if score >= self.config.threshold {
                tracing::debug!("Candidate {} matched with score {:.4}", path.display(), score);
                events.send(Event::Match(MatchEvent::MatchFound {
                    path: path.clone(),
                    score,
                }));
                matched = Some(CandidateMatch { path, score });
                break;
            }

            events.send(Event::Match(MatchEvent::CandidateCompared { path, score }));
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        tracing::info!(
            "Scanned corpus {}: {} compared, {} skipped, match: {}",
            corpus.root().display(),
            compared,
            skipped,
            matched.is_some()
        );

        events.send(Event::Match(MatchEvent::Completed(ScanSummary {
            compared,
            skipped,
            matched: matched.is_some(),
            duration_ms,
        })));

        Ok(MatchReport {
            matched,
            threshold: self.config.threshold,
            compared,
            skipped,
            duration_ms,
        })
    }
}

impl Default for ImageMatcher {
    fn default() -> Self {
        Self::new()
    }
}
