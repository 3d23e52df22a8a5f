//! DOM field extractor.
//!
//! For each field, tries structured selectors in priority order and then
//! falls back to a predicate scan over generic text-bearing elements.
//! Returns an empty string for a field nothing matched; only collaborator
//! failures are errors.

use std::sync::LazyLock;

use regex::Regex;

use crate::browser::{BrowserError, BrowserPage, ElementText};
use crate::types::{FieldKind, FieldValues};

static ADDRESS_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,}.*[A-Za-z]").expect("valid regex"));

static PHONE_SHAPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\d{2}\) ?\d|^\+\d+").expect("valid regex"));

/// Minimum rendered height, in CSS pixels, of a title fallback element.
const TITLE_MIN_HEIGHT: f64 = 20.0;

/// How one field is located on the rendered page.
pub struct FieldStrategy {
    pub kind: FieldKind,
    /// Structured selectors, tried in order; the first non-empty text wins.
    pub selectors: &'static [&'static str],
    /// Elements scanned when every selector misses.
    pub fallback_scope: &'static str,
    pub fallback: fn(&ElementText) -> bool,
}

impl std::fmt::Debug for FieldStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldStrategy")
            .field("kind", &self.kind)
            .field("selectors", &self.selectors)
            .field("fallback_scope", &self.fallback_scope)
            .finish_non_exhaustive()
    }
}

/// One strategy per field, in [`FieldKind::ALL`] order.
pub const STRATEGIES: &[FieldStrategy] = &[
    FieldStrategy {
        kind: FieldKind::Name,
        selectors: &[r#"[data-attrid="title"] span"#, "h1 span", "h1"],
        fallback_scope: "span,strong",
        fallback: looks_like_title,
    },
    FieldStrategy {
        kind: FieldKind::Address,
        selectors: &[
            r#"[data-item-id="address"] span"#,
            r#"[data-attrid*="address"] span"#,
            r#"button[data-item-id^="address:"] span"#,
        ],
        fallback_scope: "span",
        fallback: looks_like_address,
    },
    FieldStrategy {
        kind: FieldKind::Phone,
        selectors: &[
            r#"[data-attrid*="phone"] span"#,
            r#"button[data-item-id^="phone:"] span"#,
        ],
        fallback_scope: "span",
        fallback: looks_like_phone,
    },
    FieldStrategy {
        kind: FieldKind::Category,
        selectors: &[
            r#"[data-attrid="subtitle"] span"#,
            r#"[data-attrid*="business_category"] span"#,
            r#"[data-attrid*="category"] span"#,
        ],
        fallback_scope: "span",
        fallback: looks_like_category,
    },
];

/// Extract all four fields from the rendered page.
///
/// # Errors
///
/// Returns the collaborator's [`BrowserError`] when a query itself fails
/// (page closed, evaluation aborted). A field with no match is an empty
/// string, not an error.
pub async fn extract_fields(page: &dyn BrowserPage) -> Result<FieldValues, BrowserError> {
    let mut values = FieldValues::default();
    for strategy in STRATEGIES {
        let text = extract_field(page, strategy).await?;
        tracing::debug!(field = %strategy.kind, value = %text, "dom field");
        values.set(strategy.kind, text);
    }
    Ok(values)
}

async fn extract_field(
    page: &dyn BrowserPage,
    strategy: &FieldStrategy,
) -> Result<String, BrowserError> {
    for selector in strategy.selectors {
        if let Some(text) = page.query_text(selector).await? {
            let text = text.trim();
            if !text.is_empty() {
                return Ok(text.to_string());
            }
        }
    }

    let elements = page.element_texts(strategy.fallback_scope).await?;
    Ok(elements
        .iter()
        .find(|el| (strategy.fallback)(el))
        .map(|el| el.text.trim().to_string())
        .unwrap_or_default())
}

/// Unknown height (no layout) counts as tall enough.
fn looks_like_title(el: &ElementText) -> bool {
    el.text.chars().count() > 3 && el.height.is_none_or(|h| h > TITLE_MIN_HEIGHT)
}

fn looks_like_address(el: &ElementText) -> bool {
    ADDRESS_SHAPE_RE.is_match(&el.text) && el.text.chars().count() > 10
}

fn looks_like_phone(el: &ElementText) -> bool {
    PHONE_SHAPE_RE.is_match(&el.text)
}

fn looks_like_category(el: &ElementText) -> bool {
    let len = el.text.chars().count();
    len > 2 && len < 50 && !el.text.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
#[path = "dom_test.rs"]
mod tests;
