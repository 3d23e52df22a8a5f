//! Decoding of the script-injected state dump captured from a place page.
//!
//! The capture script returns a JSON string shaped like
//! `{"APP_INITIALIZATION_STATE": [...], "_pageData": ..., "ldjson": ["{...}"]}`.
//! The place itself lives in a `)]}'`-prefixed JSON string somewhere inside
//! `APP_INITIALIZATION_STATE`; its index 6 holds the place array whose
//! positions are read by [`PlaceFields`].

use serde_json::Value;

use crate::error::CaptureError;

/// Script evaluated in the page to pull the embedded state and every JSON-LD
/// body. Returns a JSON string.
pub const CAPTURE_SCRIPT: &str = r#"
(function() {
	const out = {};
	if (window.APP_INITIALIZATION_STATE) {
		out['APP_INITIALIZATION_STATE'] = window.APP_INITIALIZATION_STATE;
	}
	if (window._pageData) {
		out['_pageData'] = window._pageData;
	}
	out['ldjson'] = Array.from(
		document.querySelectorAll('script[type="application/ld+json"]')
	).map(s => s.innerText);
	return JSON.stringify(out);
})()
"#;

const XSSI_PREFIX: &str = ")]}'";

const APP_STATE_KEY: &str = "APP_INITIALIZATION_STATE";
const PAGE_DATA_KEY: &str = "_pageData";
const LD_JSON_KEY: &str = "ldjson";

/// Index paths into the place array.
mod path {
    pub(super) const REVIEW_COUNT: &[usize] = &[4, 8];
    pub(super) const REVIEW_RATING: &[usize] = &[4, 7];
    pub(super) const WEBSITE: &[usize] = &[7, 0];
    pub(super) const LATITUDE: &[usize] = &[9, 2];
    pub(super) const LONGITUDE: &[usize] = &[9, 3];
    pub(super) const CID: &[usize] = &[10];
    pub(super) const TITLE: &[usize] = &[11];
    pub(super) const CATEGORIES: &[usize] = &[13];
    pub(super) const ADDRESS: &[usize] = &[18];
    pub(super) const LINK: &[usize] = &[27];
}

/// schema.org types treated as a business description.
const BUSINESS_TYPES: &[&str] = &[
    "LocalBusiness",
    "Organization",
    "Store",
    "Restaurant",
    "FoodEstablishment",
    "Bakery",
    "CafeOrCoffeeShop",
    "BarOrPub",
    "AutoRepair",
    "HealthAndBeautyBusiness",
    "MedicalBusiness",
    "ProfessionalService",
];

/// Strip the `)]}'` prefix (and the whitespace after it) from a payload
/// string. Returns `None` when the prefix is absent.
#[must_use]
pub fn strip_xssi_prefix(s: &str) -> Option<&str> {
    s.strip_prefix(XSSI_PREFIX).map(str::trim_start)
}

/// The decoded state dump of one place page. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCapture {
    app_state: Option<Value>,
    page_data: Option<Value>,
    ld_json: Vec<Value>,
    place: Option<Vec<Value>>,
}

impl RawCapture {
    /// Decode the capture script's JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Empty`] for a blank payload,
    /// [`CaptureError::Deserialize`] when it is not JSON, and
    /// [`CaptureError::MissingState`] when none of the state keys are present.
    pub fn from_json(raw: &str, url: &str) -> Result<Self, CaptureError> {
        if raw.trim().is_empty() {
            return Err(CaptureError::Empty {
                url: url.to_string(),
            });
        }
        let value: Value =
            serde_json::from_str(raw).map_err(|source| CaptureError::Deserialize {
                context: format!("capture payload for {url}"),
                source,
            })?;
        Self::from_value(value, url)
    }

    /// Build from an already-parsed payload object.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::MissingState`] when `value` is not an object
    /// carrying any of the expected keys.
    pub fn from_value(value: Value, url: &str) -> Result<Self, CaptureError> {
        let Value::Object(mut map) = value else {
            return Err(CaptureError::MissingState {
                url: url.to_string(),
            });
        };

        let app_state = map.remove(APP_STATE_KEY);
        let page_data = map.remove(PAGE_DATA_KEY);
        let ld_raw = map.remove(LD_JSON_KEY);

        if app_state.is_none() && page_data.is_none() && ld_raw.is_none() {
            return Err(CaptureError::MissingState {
                url: url.to_string(),
            });
        }

        let ld_json = ld_raw.map(decode_ld_json).unwrap_or_default();
        let place = app_state.as_ref().and_then(find_place_array);
        if place.is_none() {
            tracing::debug!(url, "no place payload found in application state");
        }

        Ok(Self {
            app_state,
            page_data,
            ld_json,
            place,
        })
    }

    /// Top-level application-state blocks in index order. A non-array state
    /// is a single block.
    pub fn blocks(&self) -> impl Iterator<Item = &Value> {
        let slice: &[Value] = match &self.app_state {
            Some(Value::Array(items)) => items,
            Some(other) => std::slice::from_ref(other),
            None => &[],
        };
        slice.iter()
    }

    #[must_use]
    pub fn page_data(&self) -> Option<&Value> {
        self.page_data.as_ref()
    }

    /// Decoded JSON-LD documents, flattened (arrays and `@graph` expanded).
    #[must_use]
    pub fn ld_json(&self) -> &[Value] {
        &self.ld_json
    }

    #[must_use]
    pub fn has_place(&self) -> bool {
        self.place.is_some()
    }

    /// Review count from the place payload, falling back to JSON-LD
    /// `aggregateRating.reviewCount`. Zero when neither has one.
    #[must_use]
    pub fn review_count(&self) -> u32 {
        self.place_value(path::REVIEW_COUNT)
            .and_then(as_count)
            .or_else(|| {
                self.ld_business()
                    .and_then(|b| b.get("aggregateRating"))
                    .and_then(|r| r.get("reviewCount"))
                    .and_then(as_count)
            })
            .unwrap_or(0)
    }

    /// Structured fields read from the place payload and JSON-LD.
    #[must_use]
    pub fn place_fields(&self) -> PlaceFields {
        let title = self.place_str(path::TITLE);
        let address = self.place_str(path::ADDRESS).map(|addr| {
            // The payload repeats the title in front of the address.
            let trimmed = title
                .as_deref()
                .and_then(|t| addr.strip_prefix(t))
                .and_then(|rest| rest.strip_prefix(','))
                .unwrap_or(&addr);
            trimmed.trim().to_string()
        });

        let categories = self
            .place_value(path::CATEGORIES)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let website = self.place_str(path::WEBSITE).or_else(|| {
            self.ld_business()
                .and_then(|b| b.get("url"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });

        let review_rating = self
            .place_value(path::REVIEW_RATING)
            .and_then(Value::as_f64)
            .or_else(|| {
                self.ld_business()
                    .and_then(|b| b.get("aggregateRating"))
                    .and_then(|r| r.get("ratingValue"))
                    .and_then(as_f64_lenient)
            });

        PlaceFields {
            title,
            address,
            categories,
            website: website.filter(|w| !w.trim().is_empty()),
            link: self.place_str(path::LINK),
            cid: self.place_str(path::CID),
            review_count: self.review_count(),
            review_rating,
            latitude: self.place_value(path::LATITUDE).and_then(Value::as_f64),
            longitude: self.place_value(path::LONGITUDE).and_then(Value::as_f64),
        }
    }

    fn place_value(&self, path: &[usize]) -> Option<&Value> {
        let place = self.place.as_deref()?;
        let (first, rest) = path.split_first()?;
        nth(place.get(*first)?, rest)
    }

    fn place_str(&self, path: &[usize]) -> Option<String> {
        self.place_value(path)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn ld_business(&self) -> Option<&Value> {
        self.ld_json.iter().find(|item| is_business(item))
    }
}

/// Structured place fields. Every value is optional; absent paths are not
/// errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceFields {
    pub title: Option<String>,
    pub address: Option<String>,
    pub categories: Vec<String>,
    pub website: Option<String>,
    pub link: Option<String>,
    pub cid: Option<String>,
    pub review_count: u32,
    pub review_rating: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn nth<'a>(value: &'a Value, path: &[usize]) -> Option<&'a Value> {
    path.iter()
        .try_fold(value, |current, idx| current.as_array()?.get(*idx))
}

/// Depth-first search of the application state for the first prefixed
/// payload whose index 6 is an array.
fn find_place_array(app_state: &Value) -> Option<Vec<Value>> {
    let mut stack: Vec<&Value> = vec![app_state];
    while let Some(value) = stack.pop() {
        match value {
            Value::String(s) => {
                let Some(payload) = strip_xssi_prefix(s) else {
                    continue;
                };
                let Ok(Value::Array(mut outer)) = serde_json::from_str::<Value>(payload) else {
                    continue;
                };
                if outer.len() > 6 {
                    if let Value::Array(place) = outer.swap_remove(6) {
                        return Some(place);
                    }
                }
            }
            Value::Array(items) => stack.extend(items.iter().rev()),
            Value::Object(map) => stack.extend(map.values().rev()),
            _ => {}
        }
    }
    None
}

/// Decode the captured JSON-LD bodies. Accepts a top-level object, array,
/// or `@graph` container; undecodable bodies are skipped.
fn decode_ld_json(raw: Value) -> Vec<Value> {
    let bodies = match raw {
        Value::Array(items) => items,
        other => vec![other],
    };

    let mut out = Vec::new();
    for body in bodies {
        let decoded = match body {
            Value::String(text) => match serde_json::from_str::<Value>(&text) {
                Ok(v) => v,
                Err(e) => {
                    tracing::debug!(error = %e, "skipping undecodable JSON-LD body");
                    continue;
                }
            },
            other => other,
        };

        let mut candidates = match decoded {
            Value::Array(items) => items,
            other => vec![other],
        };

        let mut expanded = Vec::new();
        for item in &candidates {
            if let Some(graph) = item.get("@graph").and_then(Value::as_array) {
                expanded.extend(graph.iter().cloned());
            }
        }
        candidates.extend(expanded);
        out.extend(candidates.into_iter().filter(Value::is_object));
    }
    out
}

fn is_business(item: &Value) -> bool {
    let Some(type_node) = item.get("@type") else {
        return item.get("aggregateRating").is_some();
    };
    let type_matches = |s: &str| BUSINESS_TYPES.iter().any(|t| s.eq_ignore_ascii_case(t));
    match type_node {
        Value::String(s) => type_matches(s),
        Value::Array(items) => items.iter().filter_map(Value::as_str).any(type_matches),
        _ => false,
    }
}

/// Counts may arrive as numbers or as strings with thousands separators.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_count(value: &Value) -> Option<u32> {
    if let Some(s) = value.as_str() {
        let digits: String = s.chars().filter(|c| !matches!(c, ',' | '.' | ' ')).collect();
        return digits.parse::<u32>().ok();
    }
    let n = value.as_f64()?;
    if n.is_finite() && n >= 0.0 {
        Some(n.min(f64::from(u32::MAX)) as u32)
    } else {
        None
    }
}

/// JSON-LD ratings are often strings, sometimes with a decimal comma.
fn as_f64_lenient(value: &Value) -> Option<f64> {
    value.as_f64().or_else(|| {
        value
            .as_str()
            .and_then(|s| s.trim().replace(',', ".").parse::<f64>().ok())
    })
}
