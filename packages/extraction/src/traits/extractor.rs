//! Extractor trait for the reasoning service.
//!
//! The reasoning service turns raw text into structured records. The planner
//! never looks inside it; it only relies on this contract:
//!
//! - `Ok(vec![])` means "nothing found"
//! - `Err(RateLimited | QuotaExhausted)` means "service unavailable"
//! - `Err(Malformed)` means the output broke the schema and should be
//!   treated as zero results for that call

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{candidate::ExtractedPlace, request::ExtractionRequest, skeleton::DayPlanSkeleton};

#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract candidate places from a batched corpus.
    async fn extract_candidates(&self, request: &ExtractionRequest) -> Result<Vec<ExtractedPlace>>;

    /// Produce a day-plan skeleton from a free-form prompt.
    async fn plan_skeleton(&self, prompt: &str) -> Result<DayPlanSkeleton>;
}

#[async_trait]
impl<E: Extractor + ?Sized> Extractor for std::sync::Arc<E> {
    async fn extract_candidates(&self, request: &ExtractionRequest) -> Result<Vec<ExtractedPlace>> {
        (**self).extract_candidates(request).await
    }

    async fn plan_skeleton(&self, prompt: &str) -> Result<DayPlanSkeleton> {
        (**self).plan_skeleton(prompt).await
    }
}
