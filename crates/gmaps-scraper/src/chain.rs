//! Job chain controller.
//!
//! Decides whether a reconciled record is finished or still needs the email
//! follow-up job. The completion-count side effect lives in
//! [`ChainDecision::settle`], so each record increments the monitor exactly
//! once: here for [`ChainDecision::Finalize`], or later inside the
//! [`EmailJob`] for [`ChainDecision::SpawnFollowUp`].

use std::sync::Arc;

use gmaps_core::BusinessRecord;
use reqwest::Url;

use crate::email::EmailJob;
use crate::monitor::CompletionMonitor;

/// Hosts whose pages never carry a business's own contact address.
const SOCIAL_HOSTS: &[&str] = &[
    "facebook.com",
    "fb.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "linkedin.com",
    "youtube.com",
    "youtu.be",
    "tiktok.com",
    "wa.me",
    "whatsapp.com",
];

const GOOGLE_HOSTS: &[&str] = &["google.com", "goo.gl", "goo.gle", "g.page", "g.co"];

/// Where a decided record goes next. A record without a [`ChainDecision`]
/// is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    NeedsEmailExtraction,
    Terminal,
}

/// The controller's verdict for one record.
#[derive(Debug)]
pub enum ChainDecision {
    /// The record is done; the caller counts it.
    Finalize(Box<BusinessRecord>),
    /// The follow-up job owns the record and its completion signal.
    SpawnFollowUp(EmailJob),
}

/// What a place job hands back to the scheduler. Exactly one field is set.
#[derive(Debug)]
pub struct JobOutput {
    pub record: Option<BusinessRecord>,
    pub follow_up: Option<EmailJob>,
}

impl ChainDecision {
    #[must_use]
    pub fn state(&self) -> ChainState {
        match self {
            ChainDecision::Finalize(_) => ChainState::Terminal,
            ChainDecision::SpawnFollowUp(_) => ChainState::NeedsEmailExtraction,
        }
    }

    /// Apply the decision. `Finalize` increments `monitor` once;
    /// `SpawnFollowUp` leaves it untouched.
    #[must_use]
    pub fn settle(self, monitor: Option<&dyn CompletionMonitor>) -> JobOutput {
        match self {
            ChainDecision::Finalize(record) => {
                if let Some(m) = monitor {
                    m.incr_places_completed(1);
                }
                JobOutput {
                    record: Some(*record),
                    follow_up: None,
                }
            }
            ChainDecision::SpawnFollowUp(job) => JobOutput {
                record: None,
                follow_up: Some(job),
            },
        }
    }
}

/// Route a reconciled record.
///
/// Spawns an [`EmailJob`] (child of `job_id`) when `extract_email` is set
/// and the record's website is eligible; otherwise finalizes. `monitor` is
/// handed to the follow-up job so it can signal completion itself.
#[must_use]
pub fn decide(
    job_id: &str,
    record: BusinessRecord,
    extract_email: bool,
    monitor: Option<Arc<dyn CompletionMonitor>>,
) -> ChainDecision {
    let website = if extract_email {
        record.website().and_then(website_eligible_for_email)
    } else {
        None
    };

    match website {
        Some(url) => {
            tracing::info!(id = %record.id, website = %url, "spawning email follow-up job");
            ChainDecision::SpawnFollowUp(EmailJob::new(job_id, record, url, monitor))
        }
        None => {
            tracing::info!(id = %record.id, name = %record.name, "place finalized");
            ChainDecision::Finalize(Box::new(record))
        }
    }
}

/// Parse `website` as an absolute http(s) URL pointing at the business's own
/// site. Social networks and Google properties are rejected.
#[must_use]
pub fn website_eligible_for_email(website: &str) -> Option<Url> {
    let website = website.trim();
    if website.is_empty() {
        return None;
    }
    let url = match Url::parse(website) {
        Ok(u) => u,
        Err(e) => {
            tracing::debug!(website, error = %e, "website is not a valid URL");
            return None;
        }
    };
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    if host_in(&host, SOCIAL_HOSTS) || is_google_host(&host) {
        tracing::debug!(website, host = %host, "website host excluded from email extraction");
        return None;
    }
    Some(url)
}

fn host_in(host: &str, domains: &[&str]) -> bool {
    domains
        .iter()
        .any(|d| host == *d || host.strip_suffix(*d).is_some_and(|p| p.ends_with('.')))
}

/// `google.<tld>` and `google.com.<cc>` style hosts, plus shorteners.
fn is_google_host(host: &str) -> bool {
    host_in(host, GOOGLE_HOSTS)
        || host
            .split('.')
            .collect::<Vec<_>>()
            .windows(2)
            .any(|w| w[0] == "google" && w[1].len() <= 3)
}

#[cfg(test)]
#[path = "chain_test.rs"]
mod tests;
