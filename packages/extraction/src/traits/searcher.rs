//! Web searcher trait for place discovery.
//!
//! Discovery fans a batch of city-scoped queries out to a search provider
//! (Tavily, SerpAPI, ...) and keeps the raw content blocks for extraction.
//! The trait only covers a single query; batching, timeouts and failure
//! accounting belong to the caller.

use async_trait::async_trait;
use url::Url;

use crate::error::Result;

/// A single search hit with the raw content the provider returned.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Page the content came from.
    pub url: Url,

    /// Title of the page (if available from search results).
    pub title: Option<String>,

    /// Raw content block (snippet or extracted page text).
    pub content: String,

    /// Relevance score (0.0-1.0, if provided by search API).
    pub score: Option<f32>,
}

impl SearchResult {
    /// Create a new search result.
    pub fn new(url: Url, content: impl Into<String>) -> Self {
        Self {
            url,
            title: None,
            content: content.into(),
            score: None,
        }
    }

    /// Create from a URL string, dropping unparseable URLs.
    pub fn from_url(url: &str, content: impl Into<String>) -> Option<Self> {
        Url::parse(url).ok().map(|u| Self::new(u, content))
    }

    /// Add a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a relevance score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}

/// Web search for open-world discovery.
///
/// # Implementations
///
/// - `TavilyWebSearcher` - Tavily API
/// - `RateLimitedSearcher` - wraps any searcher with a governor quota
/// - `MockSearcher` - for testing
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the web and return up to `limit` results.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>>;
}

#[async_trait]
impl<S: WebSearcher + ?Sized> WebSearcher for std::sync::Arc<S> {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        (**self).search(query, limit).await
    }
}
