use thiserror::Error;

use crate::browser::BrowserError;

/// Failures decoding the script-injected state dump.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture script returned no data for {url}")]
    Empty { url: String },

    #[error("capture script returned a non-string value for {url}")]
    NotAString { url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("capture payload for {url} has none of the expected state keys")]
    MissingState { url: String },
}

/// Fatal errors for one place job. Anything recoverable (missing fields,
/// failed review fetches) is logged and absorbed instead.
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("page {url} did not settle within {timeout_ms}ms")]
    NavigationTimeout { url: String, timeout_ms: u64 },

    #[error("invalid place URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
