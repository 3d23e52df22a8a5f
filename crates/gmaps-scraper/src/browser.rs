//! Interface to the browser-automation collaborator.
//!
//! The engine that drives a real browser lives outside this crate; the place
//! job only needs navigation, script evaluation and a small text-query
//! surface. [`crate::SnapshotPage`] implements the same trait over a recorded
//! page for offline runs and tests.

use std::time::Duration;

use async_trait::async_trait;

/// Failures reported by the browser collaborator.
#[derive(Debug, thiserror::Error)]
pub enum BrowserError {
    #[error("page is closed")]
    Closed,

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("{what} timed out after {timeout_ms}ms")]
    Timeout { what: String, timeout_ms: u64 },

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("query \"{selector}\" failed: {reason}")]
    Query { selector: String, reason: String },
}

/// Response metadata recorded after navigating to a place URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavResponse {
    pub url: String,
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// Rendered text of one element, with its layout height when known.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementText {
    pub text: String,
    /// `offsetHeight` in CSS pixels; `None` when layout is unavailable.
    pub height: Option<f64>,
}

impl ElementText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            height: None,
        }
    }

    #[must_use]
    pub fn with_height(mut self, height: f64) -> Self {
        self.height = Some(height);
        self
    }
}

/// A live (or recorded) rendered page.
#[async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for DOM content to load.
    async fn goto(&self, url: &str) -> Result<NavResponse, BrowserError>;

    /// Wait until the page has settled on `url`.
    async fn wait_for_url(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Click the first element matching `selector`. Returns `false` when
    /// nothing matched.
    async fn click_first(&self, selector: &str) -> Result<bool, BrowserError>;

    /// Evaluate a script in the page and return its JSON result.
    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError>;

    /// `innerText` of the first element matching `selector`.
    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError>;

    /// Text of every element matching `selector`, in document order.
    async fn element_texts(&self, selector: &str) -> Result<Vec<ElementText>, BrowserError>;

    /// The URL the page currently shows.
    fn url(&self) -> String;
}
