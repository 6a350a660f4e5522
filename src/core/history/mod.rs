//! # Assessment History Module
//!
//! Keeps a local record of completed assessments so past results can be
//! reviewed. Stores outcomes only; nothing derived from corpus images is
//! persisted.

mod repository;
mod types;

pub use repository::AssessmentHistory;
pub use types::{AssessmentHistoryPage, AssessmentRecord};
