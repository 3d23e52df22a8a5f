use std::time::Duration;

#[derive(Clone)]
pub struct AppConfig {
    /// Interface language sent as the `hl` query parameter on place URLs.
    pub lang: String,
    pub extract_email: bool,
    pub extract_extra_reviews: bool,
    pub log_level: String,
    pub nav_timeout_ms: u64,
    pub review_fetch_timeout_secs: u64,
    pub email_timeout_secs: u64,
    pub user_agent: String,
    pub concurrency: usize,
}

impl AppConfig {
    #[must_use]
    pub fn nav_timeout(&self) -> Duration {
        Duration::from_millis(self.nav_timeout_ms)
    }

    #[must_use]
    pub fn review_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.review_fetch_timeout_secs)
    }

    #[must_use]
    pub fn email_timeout(&self) -> Duration {
        Duration::from_secs(self.email_timeout_secs)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("lang", &self.lang)
            .field("extract_email", &self.extract_email)
            .field("extract_extra_reviews", &self.extract_extra_reviews)
            .field("log_level", &self.log_level)
            .field("nav_timeout_ms", &self.nav_timeout_ms)
            .field(
                "review_fetch_timeout_secs",
                &self.review_fetch_timeout_secs,
            )
            .field("email_timeout_secs", &self.email_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}
