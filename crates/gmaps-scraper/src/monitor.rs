//! Completion monitor used to decide when a crawl has fully drained.

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Notify;

/// Counter of top-level places discovered and fully processed.
///
/// Implementations must tolerate concurrent increments from many jobs.
pub trait CompletionMonitor: Send + Sync {
    fn incr_places_found(&self, n: usize);
    fn incr_places_completed(&self, n: usize);
}

/// Atomic [`CompletionMonitor`] that wakes waiters once every found place
/// has completed.
#[derive(Debug, Default)]
pub struct ExitMonitor {
    found: AtomicUsize,
    completed: AtomicUsize,
    notify: Notify,
}

impl ExitMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn places_found(&self) -> usize {
        self.found.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn places_completed(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    /// At least one place was found and every found place has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        let found = self.places_found();
        found > 0 && self.places_completed() >= found
    }

    /// Resolve once [`Self::is_finished`] holds.
    pub async fn wait_finished(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent increment is not missed.
            notified.as_mut().enable();
            if self.is_finished() {
                return;
            }
            notified.await;
        }
    }
}

impl CompletionMonitor for ExitMonitor {
    fn incr_places_found(&self, n: usize) {
        self.found.fetch_add(n, Ordering::AcqRel);
        self.notify.notify_waiters();
    }

    fn incr_places_completed(&self, n: usize) {
        let completed = self.completed.fetch_add(n, Ordering::AcqRel) + n;
        tracing::debug!(completed, found = self.places_found(), "place completed");
        self.notify.notify_waiters();
    }
}
