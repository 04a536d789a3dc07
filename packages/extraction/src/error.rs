//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! "the service refused us" apart from "the service returned nothing".

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the search and reasoning services.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Provider asked us to slow down. Retryable after backoff.
    #[error("rate limited by upstream service")]
    RateLimited { retry_after: Option<Duration> },

    /// Provider quota or plan limit reached. Terminal for the request.
    #[error("upstream quota exhausted")]
    QuotaExhausted,

    /// Response did not match the requested schema
    #[error("malformed response: {reason}")]
    Malformed { reason: String },

    /// Transport or non-classified HTTP failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Call did not finish in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

impl ExtractionError {
    /// Classify a non-success HTTP status into a typed error.
    ///
    /// 402, 432 and 433 (Tavily plan limits) and 429 bodies mentioning
    /// `quota` are quota exhaustion; any other 429 is a rate limit.
    pub fn from_status(status: u16, retry_after: Option<Duration>, body: &str) -> Self {
        match status {
            402 | 432 | 433 => Self::QuotaExhausted,
            429 if body.contains("insufficient_quota") || body.contains("quota") => {
                Self::QuotaExhausted
            }
            429 => Self::RateLimited { retry_after },
            _ => Self::Http(format!("status {}: {}", status, truncate_body(body)).into()),
        }
    }

    /// Build a malformed-response error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// Whether a caller may retry this call after backing off.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_))
    }
}

fn truncate_body(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
