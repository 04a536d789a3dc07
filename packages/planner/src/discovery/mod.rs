//! Candidate discovery.
//!
//! Pipeline:
//! 1. Generate category-tagged queries scoped to the city
//! 2. Dispatch them concurrently against the web searcher
//! 3. Group content into per-category corpora and extract candidates
//! 4. Deduplicate, filter by confidence and rank
//!
//! Promotion into the catalog is a separate step ([`promote`]).

pub mod aggregate;
pub mod dedup;
pub mod dispatch;
pub mod queries;
pub mod rank;

use std::time::Duration;

use extraction::{Extractor, WebSearcher};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::catalog::PlaceCatalog;
use crate::config::DiscoveryConfig;
use crate::error::{Condition, Result};
use crate::models::{CandidatePlace, CityId, Place};

pub use dedup::{deduplicate, is_same_place, merge};
pub use dispatch::{dispatch, ContentBlock, DispatchOutcome, QueryResult};
pub use queries::{generate_queries, QueryCategory, SearchQuery};
pub use rank::filter_and_rank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRequest {
    pub city_id: CityId,
    pub city: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl DiscoveryRequest {
    pub fn new(city_id: CityId, city: impl Into<String>) -> Self {
        Self {
            city_id,
            city: city.into(),
            region: None,
            country: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    fn display_name(&self) -> String {
        [Some(self.city.as_str()), self.region.as_deref(), self.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub queries: usize,
    pub successful_queries: usize,
    pub failed_queries: usize,
    pub extraction_calls: u32,
    pub raw_records: usize,
    pub rejected_records: usize,
    pub merged_duplicates: usize,
    pub below_confidence: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub city_id: CityId,
    /// Ranked, deduplicated candidates.
    pub candidates: Vec<CandidatePlace>,
    pub degraded: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    pub stats: DiscoveryStats,
}

/// Runs discovery for a city against a searcher and an extractor.
pub struct DiscoveryPipeline<S, E> {
    searcher: S,
    extractor: E,
    config: DiscoveryConfig,
}

impl<S, E> DiscoveryPipeline<S, E>
where
    S: WebSearcher,
    E: Extractor,
{
    pub fn new(searcher: S, extractor: E) -> Self {
        Self {
            searcher,
            extractor,
            config: DiscoveryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DiscoveryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub async fn discover(
        &self,
        request: &DiscoveryRequest,
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<DiscoveryOutcome> {
        let queries = generate_queries(
            &request.city,
            request.region.as_deref(),
            request.country.as_deref(),
            self.config.variants_per_category,
        )?;
        self.discover_with_queries(request, &queries, cancel, deadline).await
    }

    /// Run discovery with a caller-supplied query set.
    pub async fn discover_with_queries(
        &self,
        request: &DiscoveryRequest,
        queries: &[SearchQuery],
        cancel: &CancellationToken,
        deadline: Option<Instant>,
    ) -> Result<DiscoveryOutcome> {
        let city = request.display_name();
        info!(city_id = %request.city_id, city = %city, queries = queries.len(), "Starting discovery");

        let dispatch_deadline = deadline.map(|at| self.dispatch_deadline(at));
        let dispatched = dispatch(&self.searcher, queries, &self.config, cancel, dispatch_deadline).await?;

        let mut conditions = Vec::new();
        let mut degraded = dispatched.degraded;
        if dispatched.degraded {
            conditions.push(Condition::PartialDegraded {
                reason: format!(
                    "{} of {} searches succeeded",
                    dispatched.successes(),
                    dispatched.total
                ),
            });
        }

        let corpora = aggregate::build_corpora(&dispatched.results, self.config.max_corpus_chars);
        let extracted = aggregate::extract_candidates(
            &self.extractor,
            &city,
            &corpora,
            &self.config,
            cancel,
            deadline,
        )
        .await?;

        if extracted.interrupted {
            degraded = true;
            conditions.push(Condition::PartialDegraded {
                reason: "extraction interrupted".to_string(),
            });
        }
        if extracted.conditions.contains(&Condition::ExtractionUnavailable) {
            degraded = true;
        }
        conditions.extend(extracted.conditions.iter().cloned());

        let raw_count = extracted.candidates.len();
        let merged = deduplicate(extracted.candidates, self.config.dedup_distance_m);
        let merged_count = merged.len();
        let candidates = filter_and_rank(merged, self.config.min_confidence);

        let stats = DiscoveryStats {
            queries: dispatched.total,
            successful_queries: dispatched.successes(),
            failed_queries: dispatched.failures,
            extraction_calls: extracted.extraction_calls,
            raw_records: extracted.raw_records,
            rejected_records: extracted.rejected_records,
            merged_duplicates: raw_count - merged_count,
            below_confidence: merged_count - candidates.len(),
        };

        if degraded {
            warn!(city_id = %request.city_id, ?stats, "Discovery degraded");
        }
        info!(
            city_id = %request.city_id,
            candidates = candidates.len(),
            degraded,
            "Discovery finished"
        );

        Ok(DiscoveryOutcome {
            city_id: request.city_id,
            candidates,
            degraded,
            conditions,
            stats,
        })
    }

    /// Dispatch gets `dispatch_share` of the time left, extraction the rest.
    fn dispatch_deadline(&self, deadline: Instant) -> Instant {
        let now = Instant::now();
        let remaining = deadline.saturating_duration_since(now);
        let share = self.config.dispatch_share.clamp(0.0, 1.0) as f64;
        now + Duration::from_secs_f64(remaining.as_secs_f64() * share)
    }
}

/// Promote candidates into the catalog as places of `city_id`.
///
/// Upserts are keyed on city and normalized name, so promoting the same
/// run twice leaves the catalog unchanged in size.
pub async fn promote<C>(
    catalog: &C,
    city_id: CityId,
    candidates: &[CandidatePlace],
) -> Result<Vec<Place>>
where
    C: PlaceCatalog + ?Sized,
{
    let mut stored = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        stored.push(catalog.upsert_place(candidate.clone().into_place(city_id)).await?);
    }
    info!(city_id = %city_id, promoted = stored.len(), "Promoted candidates");
    Ok(stored)
}
