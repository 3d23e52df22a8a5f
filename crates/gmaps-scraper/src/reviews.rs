//! Review volume gate and the extended-review fetcher interface.
//!
//! Places with more than [`REVIEW_FETCH_THRESHOLD`] reviews get their full
//! review list pulled by an external fetcher. Fetch failures and timeouts are
//! never fatal: the record proceeds with whatever pages arrived.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::watch;

use crate::browser::{BrowserError, BrowserPage};
use crate::capture::strip_xssi_prefix;

/// A place page already embeds up to this many reviews.
pub const REVIEW_FETCH_THRESHOLD: u32 = 8;

/// How long a cancelled fetcher gets to hand back partial pages.
const CANCEL_GRACE: Duration = Duration::from_secs(2);

/// Errors reported by an extended-review fetcher.
#[derive(Debug, thiserror::Error)]
pub enum ReviewFetchError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("review fetch failed: {0}")]
    Other(String),
}

/// Raw review response bodies, in fetch order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewPages {
    pub pages: Vec<String>,
}

impl ReviewPages {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Parse every page as JSON, stripping the `)]}'` prefix where present.
    /// Undecodable pages are skipped.
    #[must_use]
    pub fn decode(&self) -> Vec<Value> {
        self.pages
            .iter()
            .filter_map(|page| {
                let body = strip_xssi_prefix(page).unwrap_or(page);
                match serde_json::from_str::<Value>(body) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::debug!(error = %e, "skipping undecodable review page");
                        None
                    }
                }
            })
            .collect()
    }
}

/// Pulls the full review list for a place.
///
/// Implementations must watch `cancel`: once it flips to `true` they stop
/// and return the pages gathered so far.
#[async_trait]
pub trait ReviewFetcher: Send + Sync {
    async fn fetch(
        &self,
        page: &dyn BrowserPage,
        url: &str,
        expected: u32,
        cancel: watch::Receiver<bool>,
    ) -> Result<ReviewPages, ReviewFetchError>;
}

/// Whether `review_count` warrants an extended fetch. 8 never does; 9 does.
#[must_use]
pub fn should_fetch(review_count: u32) -> bool {
    review_count > REVIEW_FETCH_THRESHOLD
}

/// Run the gate: skip small places, otherwise fetch within `deadline`.
///
/// Returns `None` when the fetch was skipped, failed or produced nothing.
/// On deadline the fetcher is cancelled and given a short grace period to
/// return partial pages.
pub async fn fetch_extra_reviews(
    fetcher: &dyn ReviewFetcher,
    page: &dyn BrowserPage,
    url: &str,
    review_count: u32,
    deadline: Duration,
) -> Option<ReviewPages> {
    if !should_fetch(review_count) {
        tracing::debug!(url, review_count, "review count at or below threshold; skipping fetch");
        return None;
    }

    tracing::info!(url, review_count, "fetching extended reviews");
    let (cancel_tx, cancel_rx) = watch::channel(false);
    let fut = fetcher.fetch(page, url, review_count, cancel_rx);
    tokio::pin!(fut);

    let result = tokio::select! {
        result = &mut fut => result,
        () = tokio::time::sleep(deadline) => {
            tracing::warn!(url, deadline_secs = deadline.as_secs(), "extended review fetch timed out; cancelling");
            let _ = cancel_tx.send(true);
            match tokio::time::timeout(CANCEL_GRACE, &mut fut).await {
                Ok(result) => result,
                Err(_) => return None,
            }
        }
    };

    match result {
        Ok(pages) if pages.is_empty() => None,
        Ok(pages) => {
            tracing::debug!(url, pages = pages.pages.len(), "extended reviews fetched");
            Some(pages)
        }
        Err(e) => {
            tracing::warn!(url, error = %e, "extended review fetch failed; continuing without");
            None
        }
    }
}

#[cfg(test)]
#[path = "reviews_test.rs"]
mod tests;
