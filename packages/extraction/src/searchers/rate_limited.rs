//! Rate-limited searcher wrapper.
//!
//! Wraps any WebSearcher with rate limiting using the governor crate, so a
//! concurrent discovery batch never bursts past the provider's quota.

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::error::{ExtractionError, Result};
use crate::traits::searcher::{SearchResult, WebSearcher};

type DefaultRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// A searcher wrapper that enforces rate limits.
pub struct RateLimitedSearcher<S: WebSearcher> {
    inner: S,
    limiter: Arc<DefaultRateLimiter>,
}

impl<S: WebSearcher> RateLimitedSearcher<S> {
    /// Create a new rate-limited searcher.
    ///
    /// # Arguments
    /// * `searcher` - The underlying searcher to wrap
    /// * `requests_per_second` - Maximum requests per second (must be > 0)
    pub fn new(searcher: S, requests_per_second: u32) -> Result<Self> {
        let rps = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| ExtractionError::Config("requests_per_second must be > 0".into()))?;
        Ok(Self::with_quota(searcher, Quota::per_second(rps)))
    }

    /// Create with a custom quota.
    pub fn with_quota(searcher: S, quota: Quota) -> Self {
        Self {
            inner: searcher,
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// Create with burst support.
    pub fn with_burst(searcher: S, requests_per_second: u32, burst: u32) -> Result<Self> {
        let rps = NonZeroU32::new(requests_per_second)
            .ok_or_else(|| ExtractionError::Config("requests_per_second must be > 0".into()))?;
        let burst = NonZeroU32::new(burst)
            .ok_or_else(|| ExtractionError::Config("burst must be > 0".into()))?;
        Ok(Self::with_quota(
            searcher,
            Quota::per_second(rps).allow_burst(burst),
        ))
    }

    /// Access the wrapped searcher.
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: WebSearcher> WebSearcher for RateLimitedSearcher<S> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.limiter.until_ready().await;
        self.inner.search(query, limit).await
    }
}

/// Extension trait for easy rate limiting.
pub trait SearcherExt: WebSearcher + Sized {
    /// Wrap this searcher with rate limiting.
    fn rate_limited(self, requests_per_second: u32) -> Result<RateLimitedSearcher<Self>> {
        RateLimitedSearcher::new(self, requests_per_second)
    }
}

impl<S: WebSearcher + Sized> SearcherExt for S {}
