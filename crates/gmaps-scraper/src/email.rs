//! Email follow-up job.
//!
//! Spawned by the chain controller for records with an eligible website.
//! Fetches the site, collects contact addresses and then signals completion
//! for the record, whether or not the fetch succeeded.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use gmaps_core::BusinessRecord;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};

use crate::monitor::CompletionMonitor;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(?:\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}")
        .expect("valid regex")
});

static VALID_EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+\-]+@[a-z0-9\-]+(?:\.[a-z0-9\-]+)*\.[a-z]{2,}$").expect("valid regex")
});

static MAILTO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Asset names like `logo@2x.png` match the address pattern.
const ASSET_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

/// Fetches a business website and fills [`BusinessRecord::emails`].
pub struct EmailJob {
    pub id: String,
    pub parent_id: String,
    record: Box<BusinessRecord>,
    website: Url,
    monitor: Option<Arc<dyn CompletionMonitor>>,
}

impl std::fmt::Debug for EmailJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJob")
            .field("id", &self.id)
            .field("parent_id", &self.parent_id)
            .field("record_id", &self.record.id)
            .field("website", &self.website.as_str())
            .field("has_monitor", &self.monitor.is_some())
            .finish()
    }
}

impl EmailJob {
    #[must_use]
    pub fn new(
        parent_id: &str,
        record: BusinessRecord,
        website: Url,
        monitor: Option<Arc<dyn CompletionMonitor>>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: parent_id.to_string(),
            record: Box::new(record),
            website,
            monitor,
        }
    }

    #[must_use]
    pub fn website(&self) -> &Url {
        &self.website
    }

    #[must_use]
    pub fn record(&self) -> &BusinessRecord {
        &self.record
    }

    /// Fetch the website and return the record with any emails found.
    ///
    /// Never fails: fetch errors are logged and the record is returned as-is.
    /// The monitor's completed count is incremented exactly once.
    pub async fn run(
        self,
        client: &reqwest::Client,
        timeout: Duration,
        user_agent: &str,
    ) -> BusinessRecord {
        let Self {
            id,
            record,
            website,
            monitor,
            ..
        } = self;
        let mut record = *record;

        match fetch_body(client, &website, timeout, user_agent).await {
            Ok(body) => {
                record.emails = extract_emails(&body);
                tracing::info!(
                    job_id = %id,
                    website = %website,
                    emails = record.emails.len(),
                    "email extraction finished"
                );
            }
            Err(e) => {
                tracing::warn!(job_id = %id, website = %website, error = %e, "email fetch failed");
            }
        }

        if let Some(m) = monitor.as_deref() {
            m.incr_places_completed(1);
        }
        record
    }
}

async fn fetch_body(
    client: &reqwest::Client,
    url: &Url,
    timeout: Duration,
    user_agent: &str,
) -> Result<String, reqwest::Error> {
    client
        .get(url.clone())
        .header(reqwest::header::USER_AGENT, user_agent)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Addresses from `mailto:` links, or from a pattern scan of the raw body
/// when the page has none. Lower-cased, validated, de-duplicated in
/// discovery order.
#[must_use]
pub fn extract_emails(body: &str) -> Vec<String> {
    let from_links: Vec<String> = {
        let document = Html::parse_document(body);
        document
            .select(&MAILTO_SELECTOR)
            .filter_map(|a| a.value().attr("href"))
            .filter_map(mailto_address)
            .collect()
    };

    let raw: Vec<String> = if from_links.is_empty() {
        EMAIL_RE
            .find_iter(body)
            .map(|m| m.as_str().to_string())
            .collect()
    } else {
        from_links
    };

    let mut out: Vec<String> = Vec::new();
    for candidate in raw {
        let email = candidate.trim().to_lowercase();
        if is_valid_email(&email) && !out.contains(&email) {
            out.push(email);
        }
    }
    out
}

fn mailto_address(href: &str) -> Option<String> {
    let scheme = href.get(..7)?;
    if !scheme.eq_ignore_ascii_case("mailto:") {
        return None;
    }
    let address = href[7..].split('?').next()?.trim();
    (!address.is_empty()).then(|| address.to_string())
}

fn is_valid_email(email: &str) -> bool {
    VALID_EMAIL_RE.is_match(email) && !ASSET_SUFFIXES.iter().any(|s| email.ends_with(s))
}
