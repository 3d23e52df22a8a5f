//! In-memory browser page for unit tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{BrowserError, BrowserPage, ElementText, NavResponse};

#[derive(Default)]
pub(crate) struct FakePage {
    pub(crate) texts: HashMap<&'static str, &'static str>,
    pub(crate) scopes: HashMap<&'static str, Vec<ElementText>>,
    pub(crate) state: Option<String>,
    pub(crate) closed: bool,
    pub(crate) url_never_settles: bool,
}

impl FakePage {
    pub(crate) fn text(mut self, selector: &'static str, text: &'static str) -> Self {
        self.texts.insert(selector, text);
        self
    }

    pub(crate) fn scope(mut self, selector: &'static str, elements: Vec<ElementText>) -> Self {
        self.scopes.insert(selector, elements);
        self
    }

    pub(crate) fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}

#[async_trait]
impl BrowserPage for FakePage {
    async fn goto(&self, url: &str) -> Result<NavResponse, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        Ok(NavResponse {
            url: url.to_string(),
            status: 200,
            headers: Vec::new(),
        })
    }

    async fn wait_for_url(&self, _url: &str, timeout: Duration) -> Result<(), BrowserError> {
        if self.url_never_settles {
            return Err(BrowserError::Timeout {
                what: "wait for url".to_string(),
                timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }

    async fn click_first(&self, _selector: &str) -> Result<bool, BrowserError> {
        Ok(false)
    }

    async fn evaluate(&self, _script: &str) -> Result<serde_json::Value, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        Ok(self
            .state
            .clone()
            .map_or(serde_json::Value::Null, serde_json::Value::String))
    }

    async fn query_text(&self, selector: &str) -> Result<Option<String>, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        Ok(self.texts.get(selector).map(|t| (*t).to_string()))
    }

    async fn element_texts(&self, selector: &str) -> Result<Vec<ElementText>, BrowserError> {
        if self.closed {
            return Err(BrowserError::Closed);
        }
        Ok(self.scopes.get(selector).cloned().unwrap_or_default())
    }

    fn url(&self) -> String {
        "https://www.google.com/maps/place/test".to_string()
    }
}
