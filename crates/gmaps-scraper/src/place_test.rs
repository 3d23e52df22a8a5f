use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::watch;

use super::*;
use crate::browser::ElementText;
use crate::chain::ChainState;
use crate::monitor::ExitMonitor;
use crate::reviews::ReviewFetchError;
use crate::test_support::FakePage;

const PLACE_URL: &str = "https://www.google.com/maps/place/Padaria+Bom+Pao/data=!4m2";

/// Capture-script output with a place payload and some loose strings.
fn state_json(review_count: u32, website: Option<&str>) -> String {
    let mut place = vec![Value::Null; 28];
    place[4] = json!([null, null, null, null, null, null, null, 4.6, review_count]);
    place[7] = website.map_or(Value::Null, |w| json!([w, w]));
    place[9] = json!([null, null, -20.14, -44.88]);
    place[10] = json!("0x1f3e0cafe:0x12");
    place[11] = json!("Padaria Bom Pão");
    place[13] = json!(["Padaria", "Confeitaria"]);
    let mut outer = vec![Value::Null; 7];
    outer[6] = Value::Array(place);
    let embedded = format!(")]}}'\n{}", Value::Array(outer));

    json!({
        "APP_INITIALIZATION_STATE": [
            ["0x1f3e0cafe", "Rua das Flores, 123 - MG", "★★★★"],
            [null, embedded]
        ],
        "_pageData": null,
        "ldjson": []
    })
    .to_string()
}

fn page_with_state(state: String) -> FakePage {
    FakePage::default()
        .state(state)
        .text("h1 span", "Padaria Bom Pão")
        .text(r#"[data-attrid*="phone"] span"#, "(37) 3222-1000")
}

struct CountingFetcher {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingFetcher {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReviewFetcher for CountingFetcher {
    async fn fetch(
        &self,
        _page: &dyn BrowserPage,
        _url: &str,
        _expected: u32,
        _cancel: watch::Receiver<bool>,
    ) -> Result<ReviewPages, ReviewFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ReviewFetchError::Other("network unreachable".to_string()));
        }
        Ok(ReviewPages {
            pages: vec![")]}'\n[[\"ótimo pão\"]]".to_string()],
        })
    }
}

fn job(extract_email: bool, extract_extra_reviews: bool) -> PlaceJob {
    PlaceJob::new("seed-1", "pt-BR", PLACE_URL, extract_email, extract_extra_reviews).unwrap()
}

// -----------------------------------------------------------------------
// Construction
// -----------------------------------------------------------------------

#[test]
fn url_carries_language_parameter() {
    let job = job(false, false);
    let url = Url::parse(job.url()).unwrap();
    let hl: Vec<_> = url.query_pairs().filter(|(k, _)| k == "hl").collect();
    assert_eq!(hl.len(), 1);
    assert_eq!(hl[0].1, "pt-BR");
}

#[test]
fn existing_language_parameter_is_replaced() {
    let job = PlaceJob::new("seed-1", "en", "https://maps.example/place?hl=de&q=x", false, false)
        .unwrap();
    assert_eq!(job.url(), "https://maps.example/place?q=x&hl=en");
}

#[test]
fn relative_url_is_rejected() {
    let err = PlaceJob::new("seed-1", "en", "/maps/place/x", false, false).unwrap_err();
    assert!(matches!(err, PlaceError::InvalidUrl { .. }));
}

#[test]
fn each_job_gets_its_own_id() {
    assert_ne!(job(false, false).id, job(false, false).id);
}

// -----------------------------------------------------------------------
// Pipeline
// -----------------------------------------------------------------------

#[tokio::test]
async fn dom_values_win_and_scanner_fills_gaps() {
    let job = job(false, false);
    let page = page_with_state(state_json(3, None));

    let capture = job.browser_actions(&page, None).await.unwrap();
    assert_eq!(capture.response.status, 200);

    let output = job.process(capture).settle(None);
    let record = output.record.unwrap();
    assert_eq!(record.id, "seed-1");
    assert_eq!(record.name, "Padaria Bom Pão");
    assert_eq!(record.phone, "(37) 3222-1000");
    assert_eq!(record.address, "Rua das Flores, 123 - MG");
    assert_eq!(record.categories, vec!["Padaria", "Confeitaria"]);
    assert_eq!(record.review_count, 3);
    assert_eq!(record.cid.as_deref(), Some("0x1f3e0cafe:0x12"));
    // No link in the payload: falls back to the job URL.
    assert_eq!(record.link, job.url());
}

#[test]
fn payload_title_and_address_fill_only_empty_fields() {
    let place = PlaceFields {
        title: Some("Padaria 24 Horas".to_string()),
        address: Some("Rua das Flores, 123 - MG".to_string()),
        ..PlaceFields::default()
    };
    let reconciled = FieldValues {
        address: "Av. Brasil, 900 - Centro".to_string(),
        ..FieldValues::default()
    };

    let fields = fill_from_place(reconciled, &place);
    assert_eq!(fields.name, "Padaria 24 Horas");
    assert_eq!(fields.address, "Av. Brasil, 900 - Centro");
    assert_eq!(fields.phone, "");

    let blank = PlaceFields {
        title: Some("  ".to_string()),
        ..PlaceFields::default()
    };
    assert_eq!(fill_from_place(FieldValues::default(), &blank).name, "");
}

#[tokio::test]
async fn processing_the_same_capture_twice_is_identical() {
    let job = job(false, false);
    let page = page_with_state(state_json(3, None));
    let capture = job.browser_actions(&page, None).await.unwrap();

    let first = job.process(capture.clone()).settle(None).record.unwrap();
    let second = job.process(capture).settle(None).record.unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn fallback_elements_feed_dom_fields() {
    let job = job(false, false);
    let page = page_with_state(state_json(0, None)).scope(
        "span",
        vec![ElementText::new("Rua Principal, 500 - Centro")],
    );
    let record = job
        .process(job.browser_actions(&page, None).await.unwrap())
        .settle(None)
        .record
        .unwrap();
    assert_eq!(record.address, "Rua Principal, 500 - Centro");
}

#[tokio::test]
async fn unsettled_navigation_is_fatal() {
    let job = job(false, false);
    let page = FakePage {
        url_never_settles: true,
        ..page_with_state(state_json(3, None))
    };
    let err = job.browser_actions(&page, None).await.unwrap_err();
    assert!(matches!(err, PlaceError::NavigationTimeout { timeout_ms: 5000, .. }));
}

#[tokio::test]
async fn missing_state_is_fatal() {
    let job = job(false, false);
    let err = job.browser_actions(&FakePage::default(), None).await.unwrap_err();
    assert!(matches!(err, PlaceError::Capture(CaptureError::Empty { .. })));

    let page = FakePage::default().state("{not json");
    let err = job.browser_actions(&page, None).await.unwrap_err();
    assert!(matches!(err, PlaceError::Capture(CaptureError::Deserialize { .. })));
}

#[tokio::test]
async fn closed_page_is_fatal() {
    let page = FakePage {
        closed: true,
        ..FakePage::default()
    };
    let err = job(false, false).browser_actions(&page, None).await.unwrap_err();
    assert!(matches!(err, PlaceError::Browser(BrowserError::Closed)));
}

// -----------------------------------------------------------------------
// Review gate
// -----------------------------------------------------------------------

#[tokio::test]
async fn eight_reviews_never_fetch() {
    let fetcher = CountingFetcher::ok();
    let page = page_with_state(state_json(8, None));
    let capture = job(false, true).browser_actions(&page, Some(&fetcher)).await.unwrap();
    assert_eq!(fetcher.calls(), 0);
    assert!(capture.extra_reviews.is_none());
}

#[tokio::test]
async fn nine_reviews_fetch_and_attach_pages() {
    let fetcher = CountingFetcher::ok();
    let job = job(false, true);
    let page = page_with_state(state_json(9, None));
    let capture = job.browser_actions(&page, Some(&fetcher)).await.unwrap();
    assert_eq!(fetcher.calls(), 1);

    let record = job.process(capture).settle(None).record.unwrap();
    assert_eq!(record.extra_reviews, vec![json!([["ótimo pão"]])]);
}

#[tokio::test]
async fn extra_reviews_disabled_skips_fetcher() {
    let fetcher = CountingFetcher::ok();
    let page = page_with_state(state_json(40, None));
    job(false, false)
        .browser_actions(&page, Some(&fetcher))
        .await
        .unwrap();
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn failed_review_fetch_still_finalizes() {
    let monitor = Arc::new(ExitMonitor::new());
    monitor.incr_places_found(1);
    let fetcher = CountingFetcher::failing();
    let job = job(false, true).with_monitor(monitor.clone());
    let page = page_with_state(state_json(15, None));

    let output = job.run(&page, Some(&fetcher)).await.unwrap();
    assert_eq!(fetcher.calls(), 1);
    let record = output.record.unwrap();
    assert!(record.extra_reviews.is_empty());
    assert_eq!(record.review_count, 15);
    assert!(monitor.is_finished());
}

// -----------------------------------------------------------------------
// Chaining
// -----------------------------------------------------------------------

#[tokio::test]
async fn eligible_website_defers_completion_to_email_job() {
    let monitor = Arc::new(ExitMonitor::new());
    monitor.incr_places_found(1);
    let job = job(true, false).with_monitor(monitor.clone());
    let page = page_with_state(state_json(3, Some("http://example.com")));

    let capture = job.browser_actions(&page, None).await.unwrap();
    let decision = job.process(capture);
    assert_eq!(decision.state(), ChainState::NeedsEmailExtraction);

    let output = job.run(&page, None).await.unwrap();
    let email_job = output.follow_up.unwrap();
    assert!(output.record.is_none());
    assert_eq!(email_job.parent_id, job.id);
    assert_eq!(email_job.record().id, "seed-1");
    assert_eq!(monitor.places_completed(), 0);
}
