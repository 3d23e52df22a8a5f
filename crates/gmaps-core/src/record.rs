//! The canonical business record produced for one captured place page.

use serde::{Deserialize, Serialize};

/// One business listing after field reconciliation.
///
/// `name`, `address`, `phone` and `category` hold reconciled values and are
/// empty strings when neither extraction source found anything. The remaining
/// fields come from the structured place payload embedded in the page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessRecord {
    /// Identity assigned by the caller (the seed job that discovered the place).
    pub id: String,
    pub link: String,
    /// Google customer id, when the payload exposes one.
    pub cid: Option<String>,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub category: String,
    #[serde(default)]
    pub categories: Vec<String>,
    pub website: Option<String>,
    pub review_count: u32,
    pub review_rating: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Decoded review pages returned by the extended review fetch.
    #[serde(default)]
    pub extra_reviews: Vec<serde_json::Value>,
    /// Filled by the email follow-up job.
    #[serde(default)]
    pub emails: Vec<String>,
}

impl BusinessRecord {
    /// Returns the website with surrounding whitespace removed, or `None` when
    /// absent or blank.
    #[must_use]
    pub fn website(&self) -> Option<&str> {
        self.website
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
    }
}
