//! Place job: capture one place page and turn it into a routed record.
//!
//! [`PlaceJob::browser_actions`] drives the page and gathers everything that
//! needs it (state dump, DOM fields, extended reviews). [`PlaceJob::process`]
//! is pure: it scans, reconciles and hands the record to the chain
//! controller.

use std::sync::Arc;
use std::time::Duration;

use gmaps_core::{AppConfig, BusinessRecord};
use reqwest::Url;

use crate::browser::{BrowserError, BrowserPage, NavResponse};
use crate::capture::{PlaceFields, RawCapture, CAPTURE_SCRIPT};
use crate::chain::{decide, ChainDecision, JobOutput};
use crate::dom::extract_fields;
use crate::error::{CaptureError, PlaceError};
use crate::monitor::CompletionMonitor;
use crate::reconcile::reconcile;
use crate::reviews::{fetch_extra_reviews, ReviewFetcher, ReviewPages};
use crate::scan::scan_blocks;
use crate::types::{FieldKind, FieldValues};

/// First button of the consent interstitial; clicking it dismisses the form.
const CONSENT_BUTTON_SELECTOR: &str =
    r#"form[action="https://consent.google.com/save"]:first-of-type button:first-of-type"#;

const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_millis(5000);
const DEFAULT_REVIEW_FETCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Everything gathered from the live page for one place.
#[derive(Debug, Clone)]
pub struct PlaceCapture {
    pub response: NavResponse,
    pub raw: RawCapture,
    pub dom: FieldValues,
    pub extra_reviews: Option<ReviewPages>,
}

/// Job that extracts one place listing.
pub struct PlaceJob {
    pub id: String,
    /// Identity of the seed job; becomes the record id.
    pub parent_id: String,
    url: Url,
    pub extract_email: bool,
    pub extract_extra_reviews: bool,
    monitor: Option<Arc<dyn CompletionMonitor>>,
    nav_timeout: Duration,
    review_fetch_timeout: Duration,
}

impl std::fmt::Debug for PlaceJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceJob")
            .field("id", &self.id)
            .field("parent_id", &self.parent_id)
            .field("url", &self.url.as_str())
            .field("extract_email", &self.extract_email)
            .field("extract_extra_reviews", &self.extract_extra_reviews)
            .field("has_monitor", &self.monitor.is_some())
            .finish_non_exhaustive()
    }
}

impl PlaceJob {
    /// Build a job for `url`, requesting the page in `lang`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::InvalidUrl`] when `url` is not an absolute URL.
    pub fn new(
        parent_id: &str,
        lang: &str,
        url: &str,
        extract_email: bool,
        extract_extra_reviews: bool,
    ) -> Result<Self, PlaceError> {
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: parent_id.to_string(),
            url: place_url(url, lang)?,
            extract_email,
            extract_extra_reviews,
            monitor: None,
            nav_timeout: DEFAULT_NAV_TIMEOUT,
            review_fetch_timeout: DEFAULT_REVIEW_FETCH_TIMEOUT,
        })
    }

    /// Build a job with language, flags and timeouts taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::InvalidUrl`] when `url` is not an absolute URL.
    pub fn from_config(parent_id: &str, url: &str, config: &AppConfig) -> Result<Self, PlaceError> {
        Ok(Self::new(
            parent_id,
            &config.lang,
            url,
            config.extract_email,
            config.extract_extra_reviews,
        )?
        .with_timeouts(config.nav_timeout(), config.review_fetch_timeout()))
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<dyn CompletionMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    #[must_use]
    pub fn with_timeouts(mut self, nav: Duration, review_fetch: Duration) -> Self {
        self.nav_timeout = nav;
        self.review_fetch_timeout = review_fetch;
        self
    }

    /// Navigation URL, including the `hl` language parameter.
    #[must_use]
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Drive the page and collect the capture.
    ///
    /// # Errors
    ///
    /// Navigation, consent-click, URL-settle, script and DOM query failures
    /// are fatal, as is an undecodable state dump. Extended-review failures
    /// are not.
    pub async fn browser_actions(
        &self,
        page: &dyn BrowserPage,
        review_fetcher: Option<&dyn ReviewFetcher>,
    ) -> Result<PlaceCapture, PlaceError> {
        tracing::debug!(job_id = %self.id, url = %self.url, "navigating to place");
        let response = page.goto(self.url.as_str()).await?;

        if page.click_first(CONSENT_BUTTON_SELECTOR).await? {
            tracing::debug!(job_id = %self.id, "dismissed consent form");
        }

        let current = page.url();
        self.wait_until_settled(page, &current).await?;

        let raw = self.capture_state(page, &current).await?;
        let dom = extract_fields(page).await?;

        let extra_reviews = match review_fetcher {
            Some(fetcher) if self.extract_extra_reviews => {
                fetch_extra_reviews(
                    fetcher,
                    page,
                    &current,
                    raw.review_count(),
                    self.review_fetch_timeout,
                )
                .await
            }
            _ => None,
        };

        Ok(PlaceCapture {
            response,
            raw,
            dom,
            extra_reviews,
        })
    }

    /// Build the record from `capture` and route it.
    #[must_use]
    pub fn process(&self, capture: PlaceCapture) -> ChainDecision {
        let record = self.build_record(capture);
        decide(&self.id, record, self.extract_email, self.monitor.clone())
    }

    /// [`Self::browser_actions`] then [`Self::process`], settling the
    /// decision against this job's monitor.
    ///
    /// # Errors
    ///
    /// See [`Self::browser_actions`].
    pub async fn run(
        &self,
        page: &dyn BrowserPage,
        review_fetcher: Option<&dyn ReviewFetcher>,
    ) -> Result<JobOutput, PlaceError> {
        let capture = self.browser_actions(page, review_fetcher).await?;
        Ok(self.process(capture).settle(self.monitor.as_deref()))
    }

    fn build_record(&self, capture: PlaceCapture) -> BusinessRecord {
        let PlaceCapture {
            raw,
            dom,
            extra_reviews,
            ..
        } = capture;

        let candidates = scan_blocks(raw.blocks());
        let place = raw.place_fields();
        let fields = fill_from_place(reconcile(&dom, &candidates), &place);

        let record = BusinessRecord {
            id: self.parent_id.clone(),
            link: place
                .link
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| self.url.to_string()),
            cid: place.cid,
            name: fields.name,
            address: fields.address,
            phone: fields.phone,
            category: fields.category,
            categories: place.categories,
            website: place.website,
            review_count: place.review_count,
            review_rating: place.review_rating,
            latitude: place.latitude,
            longitude: place.longitude,
            extra_reviews: extra_reviews.map(|p| p.decode()).unwrap_or_default(),
            emails: Vec::new(),
        };
        tracing::info!(
            job_id = %self.id,
            name = %record.name,
            review_count = record.review_count,
            extra_reviews = record.extra_reviews.len(),
            "place record reconciled"
        );
        record
    }

    async fn wait_until_settled(&self, page: &dyn BrowserPage, url: &str) -> Result<(), PlaceError> {
        let timeout_error = || PlaceError::NavigationTimeout {
            url: url.to_string(),
            timeout_ms: u64::try_from(self.nav_timeout.as_millis()).unwrap_or(u64::MAX),
        };
        match tokio::time::timeout(self.nav_timeout, page.wait_for_url(url, self.nav_timeout)).await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(BrowserError::Timeout { .. })) | Err(_) => Err(timeout_error()),
            Ok(Err(e)) => Err(e.into()),
        }
    }

    async fn capture_state(&self, page: &dyn BrowserPage, url: &str) -> Result<RawCapture, PlaceError> {
        let value = page.evaluate(CAPTURE_SCRIPT).await?;
        let raw = match value {
            serde_json::Value::String(s) => RawCapture::from_json(&s, url)?,
            serde_json::Value::Null => {
                return Err(CaptureError::Empty {
                    url: url.to_string(),
                }
                .into())
            }
            obj @ serde_json::Value::Object(_) => RawCapture::from_value(obj, url)?,
            _ => {
                return Err(CaptureError::NotAString {
                    url: url.to_string(),
                }
                .into())
            }
        };
        tracing::debug!(
            job_id = %self.id,
            has_place = raw.has_place(),
            has_page_data = raw.page_data().is_some(),
            ld_json = raw.ld_json().len(),
            "captured page state"
        );
        Ok(raw)
    }
}

/// Use the payload's title and address for fields neither the DOM nor the
/// scanner produced.
fn fill_from_place(mut fields: FieldValues, place: &PlaceFields) -> FieldValues {
    for (kind, value) in [
        (FieldKind::Name, &place.title),
        (FieldKind::Address, &place.address),
    ] {
        if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            if fields.get(kind).is_empty() {
                fields.set(kind, value.to_string());
            }
        }
    }
    fields
}

/// Parse `url` and set its `hl` query parameter to `lang`.
fn place_url(url: &str, lang: &str) -> Result<Url, PlaceError> {
    let mut parsed = Url::parse(url).map_err(|e| PlaceError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let kept: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| k != "hl")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    parsed
        .query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair("hl", lang);
    Ok(parsed)
}

#[cfg(test)]
#[path = "place_test.rs"]
mod tests;
