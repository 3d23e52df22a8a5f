//! `extract` command: run place jobs over recorded snapshot pages.
//!
//! Every snapshot counts as one found place. Each place is completed exactly
//! once: by the chain controller, by its email follow-up job, or here when
//! the place job fails outright.
//!
//! Snapshots cannot page through reviews, so no review fetcher runs here and
//! `GMAPS_EXTRA_REVIEWS` is rejected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use futures::stream::{self, StreamExt};
use gmaps_core::{AppConfig, BusinessRecord};
use gmaps_scraper::{CompletionMonitor, ExitMonitor, PlaceJob, SnapshotPage};

/// Load `paths`, run them with bounded concurrency and return the finished
/// records in completion order.
///
/// # Errors
///
/// Returns an error if extra reviews are requested, a snapshot cannot be
/// read or parsed, or the HTTP client cannot be built. Individual place
/// failures are logged and skipped.
pub(crate) async fn run_extract(
    config: &AppConfig,
    paths: &[PathBuf],
) -> anyhow::Result<Vec<BusinessRecord>> {
    if config.extract_extra_reviews {
        anyhow::bail!("GMAPS_EXTRA_REVIEWS needs a live browser; snapshots carry no review pages");
    }

    let snapshots = paths
        .iter()
        .map(|p| load_snapshot(p).map(|page| (seed_id(p), page)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()
        .context("failed to build HTTP client")?;

    let monitor = Arc::new(ExitMonitor::new());
    monitor.incr_places_found(snapshots.len());

    let results: Vec<Option<BusinessRecord>> = stream::iter(snapshots)
        .map(|(seed, page)| {
            let monitor = Arc::clone(&monitor);
            let client = &client;
            async move { extract_one(config, client, monitor, &seed, &page).await }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    if monitor.places_found() > 0 {
        monitor.wait_finished().await;
    }

    let failed = results.iter().filter(|r| r.is_none()).count();
    if failed > 0 {
        tracing::warn!(
            failed,
            total = results.len(),
            "some places failed extraction"
        );
    }
    tracing::info!(
        completed = monitor.places_completed(),
        found = monitor.places_found(),
        "extraction finished"
    );

    Ok(results.into_iter().flatten().collect())
}

async fn extract_one(
    config: &AppConfig,
    client: &reqwest::Client,
    monitor: Arc<ExitMonitor>,
    seed: &str,
    page: &SnapshotPage,
) -> Option<BusinessRecord> {
    let job = match PlaceJob::from_config(seed, &page.url, config) {
        Ok(job) => job.with_monitor(monitor.clone()),
        Err(e) => {
            tracing::error!(seed, error = %e, "could not build place job");
            monitor.incr_places_completed(1);
            return None;
        }
    };

    let output = match job.run(page, None).await {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(seed, url = %page.url, error = %e, "place extraction failed");
            monitor.incr_places_completed(1);
            return None;
        }
    };

    match (output.record, output.follow_up) {
        (_, Some(email_job)) => Some(
            email_job
                .run(client, config.email_timeout(), &config.user_agent)
                .await,
        ),
        (record, None) => record,
    }
}

fn load_snapshot(path: &Path) -> anyhow::Result<SnapshotPage> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    SnapshotPage::from_json(&raw)
        .with_context(|| format!("failed to parse snapshot {}", path.display()))
}

/// Seed id for a snapshot: its file stem.
fn seed_id(path: &Path) -> String {
    path.file_stem()
        .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned())
}
