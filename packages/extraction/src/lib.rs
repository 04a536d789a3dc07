//! Search and Reasoning Service Boundary
//!
//! The planner talks to two external collaborators: a web search provider
//! that returns raw content blocks for a query, and a reasoning service that
//! turns raw text into structured place records or day-plan skeletons. This
//! crate owns those contracts and their failure modes; it knows nothing about
//! itineraries.
//!
//! # Usage
//!
//! ```rust,ignore
//! use extraction::{ExtractionRequest, Extractor, WebSearcher};
//! use extraction::testing::{MockExtractor, MockSearcher};
//!
//! let searcher = MockSearcher::new().with_content("tapas seville", "https://a.com", "...");
//! let blocks = searcher.search("tapas seville", 5).await?;
//!
//! let extractor = MockExtractor::new();
//! let request = ExtractionRequest::candidates("food", "Seville, Spain", corpus);
//! let places = extractor.extract_candidates(&request).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - `WebSearcher` and `Extractor`
//! - [`types`] - Wire types (extracted places, skeletons, requests)
//! - [`searchers`] - Tavily searcher and the rate-limit wrapper
//! - [`security`] - Credential handling
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod searchers;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ExtractionError, Result};
pub use searchers::{RateLimitedSearcher, SearcherExt, TavilyWebSearcher};
pub use security::SecretString;
pub use traits::{
    extractor::Extractor,
    searcher::{SearchResult, WebSearcher},
};
pub use types::{
    candidate::{CandidateEnvelope, ExtractedPlace},
    request::{ExtractionRequest, TargetSchema},
    skeleton::{DayPlanSkeleton, SkeletonDay},
};

#[cfg(feature = "openai")]
pub use ai::OpenAIExtractor;

// Re-export testing utilities
pub use testing::{MockExtractor, MockFailure, MockSearcher};
