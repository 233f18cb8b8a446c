//! Typed errors for API access.

use thiserror::Error;

/// Errors from talking to the remote API.
///
/// Configuration problems are a separate type ([`ConfigError`]) because
/// they are fatal at startup; everything here is recoverable within a
/// session; the views render it and keep going.
///
/// [`ConfigError`]: crate::config::ConfigError
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure before any response arrived.
    #[error("connection to the API failed: {0}")]
    Connect(String),

    /// The configured request timeout elapsed.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// The server answered with a non-2xx status. The body is kept
    /// verbatim for display.
    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not valid JSON.
    #[error("invalid JSON in API response: {0}")]
    Json(#[from] serde_json::Error),

    /// A mutating call was attempted with a malformed title identifier.
    /// The request was never sent.
    #[error("invalid title identifier {0:?} (expected tt followed by 7 or 8 digits)")]
    InvalidTitleId(String),
}
