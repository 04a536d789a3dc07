//! Testing utilities including mock implementations.
//!
//! These let the planner be tested without real search or LLM calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::RwLock;
use std::time::Duration;

use crate::error::{ExtractionError, Result};
use crate::traits::{
    extractor::Extractor,
    searcher::{SearchResult, WebSearcher},
};
use crate::types::{
    candidate::ExtractedPlace, request::ExtractionRequest, skeleton::DayPlanSkeleton,
};

/// A scripted failure. `ExtractionError` is not `Clone`, so mocks store
/// this and build the error on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    QuotaExhausted,
    Malformed,
    Http,
}

impl MockFailure {
    fn to_error(self) -> ExtractionError {
        match self {
            Self::RateLimited => ExtractionError::RateLimited { retry_after: None },
            Self::QuotaExhausted => ExtractionError::QuotaExhausted,
            Self::Malformed => ExtractionError::malformed("mock malformed response"),
            Self::Http => ExtractionError::Http("mock connection reset".into()),
        }
    }
}

#[derive(Debug, Clone)]
enum MockResponse {
    Results(Vec<SearchResult>),
    Fail(MockFailure),
}

/// Mock web searcher for testing.
///
/// Unknown queries return no results.
#[derive(Default)]
pub struct MockSearcher {
    responses: RwLock<HashMap<String, MockResponse>>,
    delays: RwLock<HashMap<String, Duration>>,
    calls: RwLock<Vec<String>>,
}

impl MockSearcher {
    /// Create a new mock searcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add results for a query.
    pub fn with_results(self, query: &str, results: Vec<SearchResult>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(query.to_string(), MockResponse::Results(results));
        self
    }

    /// Add a single content block for a query (appends).
    pub fn with_content(self, query: &str, url: &str, content: &str) -> Self {
        let result = SearchResult::from_url(url, content).expect("valid mock url");
        {
            let mut responses = self.responses.write().unwrap();
            match responses.get_mut(query) {
                Some(MockResponse::Results(results)) => results.push(result),
                _ => {
                    responses.insert(query.to_string(), MockResponse::Results(vec![result]));
                }
            }
        }
        self
    }

    /// Make a query fail.
    pub fn with_failure(self, query: &str, failure: MockFailure) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(query.to_string(), MockResponse::Fail(failure));
        self
    }

    /// Make a query sleep before answering (simulates a slow provider).
    pub fn with_delay(self, query: &str, delay: Duration) -> Self {
        self.delays
            .write()
            .unwrap()
            .insert(query.to_string(), delay);
        self
    }

    /// Queries received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl WebSearcher for MockSearcher {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        self.calls.write().unwrap().push(query.to_string());

        let delay = self.delays.read().unwrap().get(query).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.read().unwrap().get(query).cloned();
        match response {
            Some(MockResponse::Results(mut results)) => {
                results.truncate(limit);
                Ok(results)
            }
            Some(MockResponse::Fail(failure)) => Err(failure.to_error()),
            None => Ok(Vec::new()),
        }
    }
}

/// Record of a call made to the mock extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum MockExtractorCall {
    Extract { label: String, corpus_len: usize },
    Skeleton { prompt: String },
}

/// A mock extractor.
///
/// Holds a list of known places and "finds" every one whose name occurs in
/// the corpus, case-insensitively. Scripted failures are consumed first.
#[derive(Default)]
pub struct MockExtractor {
    known: RwLock<Vec<ExtractedPlace>>,
    failures: RwLock<VecDeque<MockFailure>>,
    skeleton: RwLock<Option<DayPlanSkeleton>>,
    skeleton_delay: RwLock<Option<Duration>>,
    calls: RwLock<Vec<MockExtractorCall>>,
}

impl MockExtractor {
    /// Create a new mock extractor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a place the mock can recognise in text.
    pub fn with_place(self, place: ExtractedPlace) -> Self {
        self.known.write().unwrap().push(place);
        self
    }

    /// Fail the next call with `failure`. Multiple failures queue up.
    pub fn with_failure(self, failure: MockFailure) -> Self {
        self.failures.write().unwrap().push_back(failure);
        self
    }

    /// Return this skeleton from `plan_skeleton`.
    pub fn with_skeleton(self, skeleton: DayPlanSkeleton) -> Self {
        *self.skeleton.write().unwrap() = Some(skeleton);
        self
    }

    /// Make `plan_skeleton` sleep before answering.
    pub fn with_skeleton_delay(self, delay: Duration) -> Self {
        *self.skeleton_delay.write().unwrap() = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockExtractorCall> {
        self.calls.read().unwrap().clone()
    }

    fn next_failure(&self) -> Option<MockFailure> {
        self.failures.write().unwrap().pop_front()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract_candidates(&self, request: &ExtractionRequest) -> Result<Vec<ExtractedPlace>> {
        self.calls.write().unwrap().push(MockExtractorCall::Extract {
            label: request.label.clone(),
            corpus_len: request.corpus.len(),
        });

        if let Some(failure) = self.next_failure() {
            return Err(failure.to_error());
        }

        let corpus = request.corpus.to_lowercase();
        Ok(self
            .known
            .read()
            .unwrap()
            .iter()
            .filter(|p| corpus.contains(&p.name.to_lowercase()))
            .cloned()
            .collect())
    }

    async fn plan_skeleton(&self, prompt: &str) -> Result<DayPlanSkeleton> {
        self.calls.write().unwrap().push(MockExtractorCall::Skeleton {
            prompt: prompt.to_string(),
        });

        let delay = *self.skeleton_delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = self.next_failure() {
            return Err(failure.to_error());
        }

        Ok(self.skeleton.read().unwrap().clone().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_searcher_results_and_limit() {
        let searcher = MockSearcher::new()
            .with_content("tapas seville", "https://a.com", "El Rinconcillo")
            .with_content("tapas seville", "https://b.com", "Bodeguita Romero")
            .with_content("tapas seville", "https://c.com", "Casa Morales");

        let results = searcher.search("tapas seville", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "El Rinconcillo");
        assert!(searcher.search("unknown", 5).await.unwrap().is_empty());
        assert_eq!(searcher.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_searcher_failure() {
        let searcher = MockSearcher::new().with_failure("q", MockFailure::QuotaExhausted);
        let err = searcher.search("q", 5).await.unwrap_err();
        assert!(matches!(err, ExtractionError::QuotaExhausted));
    }

    #[tokio::test]
    async fn test_mock_extractor_finds_names_in_corpus() {
        let extractor = MockExtractor::new()
            .with_place(ExtractedPlace::new("Torre de Belém", "attraction", 0.9))
            .with_place(ExtractedPlace::new("Cervejaria Ramiro", "restaurant", 0.8));

        let request = ExtractionRequest::candidates("food", "Lisbon", "Dinner at CERVEJARIA RAMIRO.");
        let places = extractor.extract_candidates(&request).await.unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0].name, "Cervejaria Ramiro");
    }

    #[tokio::test]
    async fn test_mock_extractor_failures_are_consumed_in_order() {
        let extractor = MockExtractor::new()
            .with_failure(MockFailure::RateLimited)
            .with_failure(MockFailure::Malformed);
        let request = ExtractionRequest::candidates("food", "Lisbon", "");

        assert!(matches!(
            extractor.extract_candidates(&request).await,
            Err(ExtractionError::RateLimited { .. })
        ));
        assert!(matches!(
            extractor.extract_candidates(&request).await,
            Err(ExtractionError::Malformed { .. })
        ));
        assert!(extractor.extract_candidates(&request).await.unwrap().is_empty());
        assert_eq!(extractor.calls().len(), 3);
    }
}
