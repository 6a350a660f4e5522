//! # Events Module
//!
//! Progress reporting from the matcher to any front end.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         if let Event::Match(MatchEvent::CandidateSkipped { path, reason }) = event {
//!             eprintln!("skipped {}: {}", path.display(), reason);
//!         }
//!     }
//! });
//!
//! let report = matcher.scan_with_events(&query, &corpus, &sender)?;
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
