//! Planner errors and non-fatal conditions.
//!
//! A [`PlannerError`] aborts the call. A [`Condition`] is reported next to a
//! usable result so callers can tell a thin itinerary from a healthy one.

use extraction::ExtractionError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::CityId;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// Rate limiting persisted past the retry budget.
    #[error("upstream service kept rate limiting")]
    UpstreamRateLimited,

    #[error("upstream quota exhausted")]
    UpstreamQuotaExhausted,

    #[error("upstream returned a malformed response: {0}")]
    UpstreamMalformed(String),

    #[error("deadline exceeded before any day was planned")]
    DeadlineExceeded,

    #[error("city not found: {0}")]
    CityNotFound(CityId),

    #[error("catalog error: {0}")]
    Catalog(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PlannerError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InputInvalid(reason.into())
    }

    pub fn catalog(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Catalog(Box::new(err))
    }
}

impl From<ExtractionError> for PlannerError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::RateLimited { .. } => Self::UpstreamRateLimited,
            ExtractionError::QuotaExhausted => Self::UpstreamQuotaExhausted,
            ExtractionError::Malformed { reason } => Self::UpstreamMalformed(reason),
            ExtractionError::Config(reason) => Self::InputInvalid(reason),
            ExtractionError::Timeout(_) | ExtractionError::Cancelled => Self::DeadlineExceeded,
            other @ ExtractionError::Http(_) => Self::UpstreamMalformed(other.to_string()),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for PlannerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Catalog(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Something went wrong but the result is still usable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "condition", rename_all = "snake_case")]
pub enum Condition {
    /// Too few search queries succeeded, or the run was cut short.
    PartialDegraded { reason: String },
    /// The reasoning service kept rate limiting; later corpora were skipped.
    ExtractionUnavailable,
    /// This many reasoning calls returned unusable output.
    UpstreamMalformed { calls: u32 },
    /// The place pool ran dry starting at this day.
    Exhausted { from_day: u32 },
    /// Packing stopped at the deadline.
    DeadlineReached { packed_days: u32 },
    /// The day-plan skeleton could not be fetched; zones were inferred.
    SkeletonUnavailable { reason: String },
}
