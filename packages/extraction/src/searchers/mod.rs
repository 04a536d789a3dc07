//! Searcher implementations.
//!
//! - `TavilyWebSearcher` - Tavily search API
//! - `RateLimitedSearcher` - Wrapper that adds rate limiting

pub mod rate_limited;
pub mod tavily;

pub use rate_limited::{RateLimitedSearcher, SearcherExt};
pub use tavily::TavilyWebSearcher;
