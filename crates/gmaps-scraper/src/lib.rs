//! Extraction and job-chaining core for captured place pages.
//!
//! A place page is captured through a [`BrowserPage`], its embedded state is
//! decoded into a [`RawCapture`], fields are recovered independently by the
//! heuristic [`scan`] and the [`dom`] extractor, merged by [`reconcile`], and
//! the resulting record is routed by the [`chain`] controller.

pub mod browser;
pub mod capture;
pub mod chain;
pub mod classify;
pub mod dom;
pub mod email;
pub mod error;
pub mod monitor;
pub mod place;
pub mod reconcile;
pub mod reviews;
pub mod scan;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod test_support;

pub use browser::{BrowserError, BrowserPage, ElementText, NavResponse};
pub use capture::RawCapture;
pub use chain::{decide, ChainDecision, ChainState, JobOutput};
pub use email::EmailJob;
pub use error::{CaptureError, PlaceError};
pub use monitor::{CompletionMonitor, ExitMonitor};
pub use place::{PlaceCapture, PlaceJob};
pub use reviews::{ReviewFetchError, ReviewFetcher, ReviewPages, REVIEW_FETCH_THRESHOLD};
pub use snapshot::SnapshotPage;
pub use types::{CandidateSet, FieldCandidate, FieldKind, FieldValues, Source};
