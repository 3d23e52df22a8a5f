//! Offline [`BrowserPage`] over a recorded place page.
//!
//! A snapshot holds the final URL, HTTP status, rendered HTML and the string
//! the capture script returned. Selector queries run against the HTML with
//! `scraper`; layout is unavailable, so element heights are unknown.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::browser::{BrowserError, BrowserPage, ElementText, NavResponse};
use crate::capture::CAPTURE_SCRIPT;

/// A recorded place page.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPage {
    pub url: String,
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub html: String,
    /// Capture script output (a JSON string).
    #[serde(default)]
    pub state: String,
}

fn default_status() -> u16 {
    200
}

impl SnapshotPage {
    /// Parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when `raw` is not a snapshot object.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    fn select_texts(&self, selector: &str, limit: usize) -> Result<Vec<String>, BrowserError> {
        let parsed = Selector::parse(selector).map_err(|e| BrowserError::Query {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        let document = Html::parse_document(&self.html);
        Ok(document
            .select(&parsed)
            .take(limit)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect())
    }
}

#[async_trait]
impl BrowserPage for SnapshotPage {
    async fn goto(&self, _url: &str) -> Result<NavResponse, BrowserError> {
        Ok(NavResponse {
            url: self.url.clone(),
            status: self.status,
            headers: Vec::new(),
        })
    }

    async fn wait_for_url(&self, _url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn click_first(&self, selector: &str) -> Result<bool, BrowserError> {
        Ok(!self.select_texts(selector, 1)?.is_empty())
    }

    async fn evaluate(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        if script == CAPTURE_SCRIPT {
            Ok(serde_json::Value::String(self.state.clone()))
        } else {
            Err(BrowserError::Script(
                "snapshot pages only answer the capture script".to_string(),
            ))
        }
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        Ok(self.select_texts(selector, 1)?.into_iter().next())
    }

    async fn element_texts(&self, selector: &str) -> Result<Vec<ElementText>, BrowserError> {
        Ok(self
            .select_texts(selector, usize::MAX)?
            .into_iter()
            .map(ElementText::new)
            .collect())
    }

    fn url(&self) -> String {
        self.url.clone()
    }
}
