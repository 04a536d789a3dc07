//! Integration tests for the discovery pipeline.
//!
//! These run the full flow against mocks:
//! 1. Dispatch searches (some slow, some failing)
//! 2. Build corpora and extract candidates
//! 3. Deduplicate, filter and rank
//! 4. Promote into the catalog

use std::time::Duration;

use extraction::{ExtractedPlace, MockExtractor, MockFailure, MockSearcher};
use planner::discovery::{QueryCategory, SearchQuery};
use planner::{
    promote, City, CityId, Condition, DiscoveryConfig, DiscoveryPipeline, DiscoveryRequest, MemoryCatalog,
    PlaceCatalog, PlannerError,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Helper to build a query list by hand.
fn query(category: QueryCategory, text: &str) -> SearchQuery {
    SearchQuery::new(category, text)
}

fn request() -> DiscoveryRequest {
    DiscoveryRequest::new(City::new("Rome", "Italy").id, "Rome")
        .with_region("Lazio")
        .with_country("Italy")
}

fn fast_config() -> DiscoveryConfig {
    DiscoveryConfig::default().with_retry_base_delay(Duration::from_millis(1))
}

#[tokio::test]
async fn test_six_of_ten_timeouts_degrades_with_partial_candidates() {
    let ok = [
        (QueryCategory::Attractions, "ok attractions", "Pantheon", "attraction"),
        (QueryCategory::Food, "ok food", "Roscioli", "restaurant"),
        (QueryCategory::Bars, "ok bars", "Bar Del Fico", "bar"),
        (QueryCategory::ViewsExperiences, "ok views", "Giardino degli Aranci", "view"),
    ];
    let slow = [
        (QueryCategory::Attractions, "slow 1", "Trevi Fountain", "attraction"),
        (QueryCategory::Attractions, "slow 2", "Villa Borghese", "attraction"),
        (QueryCategory::Food, "slow 3", "Da Enzo al 29", "restaurant"),
        (QueryCategory::Nightlife, "slow 4", "Big Mama", "club"),
        (QueryCategory::Neighborhoods, "slow 5", "Monti", "zone"),
        (QueryCategory::ViewsExperiences, "slow 6", "Pincio Terrace", "view"),
    ];

    let mut searcher = MockSearcher::new();
    let mut extractor = MockExtractor::new();
    let mut queries = Vec::new();

    for (i, (category, text, name, kind)) in ok.iter().chain(slow.iter()).enumerate() {
        searcher = searcher.with_content(
            text,
            &format!("https://example.com/{}", i),
            &format!("Locals love {} in Rome.", name),
        );
        extractor = extractor.with_place(ExtractedPlace::new(*name, *kind, 0.8));
        queries.push(query(*category, text));
    }
    for (_, text, _, _) in &slow {
        searcher = searcher.with_delay(text, Duration::from_secs(2));
    }

    let config = fast_config().with_query_timeout(Duration::from_millis(50));
    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(config);

    let outcome = pipeline
        .discover_with_queries(&request(), &queries, &CancellationToken::new(), None)
        .await
        .unwrap();

    assert!(outcome.degraded);
    assert_eq!(outcome.stats.successful_queries, 4);
    assert_eq!(outcome.stats.failed_queries, 6);

    let mut names: Vec<_> = outcome.candidates.iter().map(|c| c.name().to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["Bar Del Fico", "Giardino degli Aranci", "Pantheon", "Roscioli"]
    );
    assert!(outcome
        .conditions
        .iter()
        .any(|c| matches!(c, Condition::PartialDegraded { .. })));
}

#[tokio::test]
async fn test_same_place_from_two_queries_is_merged() {
    let searcher = MockSearcher::new()
        .with_content("bars a", "https://a.example", "Bar Del Fico is the aperitivo spot.")
        .with_content("bars b", "https://b.example", "Old men play chess outside bar  del fico.");

    let mut first = ExtractedPlace::new("Bar Del Fico", "bar", 0.9).with_coordinates(41.89570, 12.47160);
    first.why_people_go = vec!["aperitivo".into()];
    let mut second = ExtractedPlace::new("bar  del fico", "bar", 0.7).with_coordinates(41.89574, 12.47162);
    second.why_people_go = vec!["chess".into()];

    let extractor = MockExtractor::new().with_place(first).with_place(second);
    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());

    let outcome = pipeline
        .discover_with_queries(
            &request(),
            &[query(QueryCategory::Bars, "bars a"), query(QueryCategory::Bars, "bars b")],
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.candidates.len(), 1);
    let bar = &outcome.candidates[0];
    assert_eq!(bar.name(), "Bar Del Fico");
    assert!(bar.details.why_people_go.contains("aperitivo"));
    assert!(bar.details.why_people_go.contains("chess"));
    assert_eq!(bar.corroboration(), 2);
    assert_eq!(outcome.stats.merged_duplicates, 1);
    assert!(!outcome.degraded);
}

#[tokio::test]
async fn test_persistent_rate_limit_reports_extraction_unavailable() {
    let searcher = MockSearcher::new().with_content("food", "https://a.example", "Roscioli");
    let extractor = MockExtractor::new()
        .with_place(ExtractedPlace::new("Roscioli", "restaurant", 0.9))
        .with_failure(MockFailure::RateLimited)
        .with_failure(MockFailure::RateLimited)
        .with_failure(MockFailure::RateLimited);

    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());
    let outcome = pipeline
        .discover_with_queries(
            &request(),
            &[query(QueryCategory::Food, "food")],
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    assert!(outcome.candidates.is_empty());
    assert!(outcome.degraded);
    assert!(outcome.conditions.contains(&Condition::ExtractionUnavailable));
}

#[tokio::test]
async fn test_rate_limit_recovers_within_retry_budget() {
    let searcher = MockSearcher::new().with_content("food", "https://a.example", "Roscioli");
    let extractor = MockExtractor::new()
        .with_place(ExtractedPlace::new("Roscioli", "restaurant", 0.9))
        .with_failure(MockFailure::RateLimited);

    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());
    let outcome = pipeline
        .discover_with_queries(
            &request(),
            &[query(QueryCategory::Food, "food")],
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(outcome.candidates.len(), 1);
    assert!(outcome.conditions.is_empty());
}

#[tokio::test]
async fn test_malformed_response_counts_as_empty_and_continues() {
    let searcher = MockSearcher::new()
        .with_content("sights", "https://a.example", "The Pantheon")
        .with_content("food", "https://b.example", "Roscioli");
    // Attractions corpus is extracted first and gets the malformed response.
    let extractor = MockExtractor::new()
        .with_place(ExtractedPlace::new("Pantheon", "attraction", 0.9))
        .with_place(ExtractedPlace::new("Roscioli", "restaurant", 0.9))
        .with_failure(MockFailure::Malformed);

    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());
    let outcome = pipeline
        .discover_with_queries(
            &request(),
            &[
                query(QueryCategory::Attractions, "sights"),
                query(QueryCategory::Food, "food"),
            ],
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    let names: Vec<_> = outcome.candidates.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Roscioli"]);
    assert!(outcome
        .conditions
        .contains(&Condition::UpstreamMalformed { calls: 1 }));
}

#[tokio::test]
async fn test_extraction_quota_is_fatal() {
    let searcher = MockSearcher::new().with_content("food", "https://a.example", "Roscioli");
    let extractor = MockExtractor::new().with_failure(MockFailure::QuotaExhausted);

    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());
    let result = pipeline
        .discover_with_queries(
            &request(),
            &[query(QueryCategory::Food, "food")],
            &CancellationToken::new(),
            None,
        )
        .await;

    assert!(matches!(result, Err(PlannerError::UpstreamQuotaExhausted)));
}

#[tokio::test]
async fn test_low_confidence_and_unknown_types_are_dropped() {
    let searcher = MockSearcher::new().with_content(
        "sights",
        "https://a.example",
        "Pantheon, Vatican Museums and a rumored Secret Tunnel",
    );
    let extractor = MockExtractor::new()
        .with_place(ExtractedPlace::new("Pantheon", "attraction", 0.9))
        .with_place(ExtractedPlace::new("Vatican Museums", "museum", 0.9))
        .with_place(ExtractedPlace::new("Secret Tunnel", "attraction", 0.2));

    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());
    let outcome = pipeline
        .discover_with_queries(
            &request(),
            &[query(QueryCategory::Attractions, "sights")],
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    let names: Vec<_> = outcome.candidates.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Pantheon"]);
    assert_eq!(outcome.stats.rejected_records, 1);
    assert_eq!(outcome.stats.below_confidence, 1);
}

#[tokio::test]
async fn test_cancellation_returns_degraded_outcome() {
    let searcher = MockSearcher::new()
        .with_content("slow", "https://a.example", "Pantheon")
        .with_delay("slow", Duration::from_secs(5));
    let pipeline = DiscoveryPipeline::new(searcher, MockExtractor::new()).with_config(fast_config());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        trigger.cancel();
    });

    let outcome = pipeline
        .discover_with_queries(&request(), &[query(QueryCategory::Attractions, "slow")], &cancel, None)
        .await
        .unwrap();

    assert!(outcome.degraded);
    assert!(outcome.candidates.is_empty());
}

#[tokio::test]
async fn test_deadline_returns_degraded_outcome() {
    let searcher = MockSearcher::new()
        .with_content("slow", "https://a.example", "Pantheon")
        .with_delay("slow", Duration::from_secs(5));
    let pipeline = DiscoveryPipeline::new(searcher, MockExtractor::new()).with_config(fast_config());

    let started = Instant::now();
    let outcome = pipeline
        .discover_with_queries(
            &request(),
            &[query(QueryCategory::Attractions, "slow")],
            &CancellationToken::new(),
            Some(started + Duration::from_millis(100)),
        )
        .await
        .unwrap();

    assert!(outcome.degraded);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_empty_city_is_invalid_input() {
    let pipeline = DiscoveryPipeline::new(MockSearcher::new(), MockExtractor::new());
    let request = DiscoveryRequest::new(CityId::new(), "   ");

    let result = pipeline.discover(&request, &CancellationToken::new(), None).await;
    assert!(matches!(result, Err(PlannerError::InputInvalid(_))));
}

#[tokio::test]
async fn test_promotion_is_idempotent() {
    let searcher = MockSearcher::new().with_content("food", "https://a.example", "Roscioli and Da Enzo");
    let extractor = MockExtractor::new()
        .with_place(ExtractedPlace::new("Roscioli", "restaurant", 0.9))
        .with_place(ExtractedPlace::new("Da Enzo", "restaurant", 0.8));
    let pipeline = DiscoveryPipeline::new(searcher, extractor).with_config(fast_config());

    let catalog = MemoryCatalog::new();
    let city = catalog.upsert_city(City::new("Rome", "Italy")).await.unwrap();
    let request = DiscoveryRequest::new(city.id, "Rome").with_country("Italy");

    let outcome = pipeline
        .discover_with_queries(
            &request,
            &[query(QueryCategory::Food, "food")],
            &CancellationToken::new(),
            None,
        )
        .await
        .unwrap();

    let first = promote(&catalog, city.id, &outcome.candidates).await.unwrap();
    let second = promote(&catalog, city.id, &outcome.candidates).await.unwrap();

    assert_eq!(catalog.place_count().await, 2);
    assert_eq!(
        first.iter().map(|p| p.id).collect::<Vec<_>>(),
        second.iter().map(|p| p.id).collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn test_generated_queries_are_scoped_to_city() {
    let searcher = MockSearcher::new();
    let pipeline = DiscoveryPipeline::new(searcher, MockExtractor::new()).with_config(fast_config());

    let outcome = pipeline
        .discover(&request(), &CancellationToken::new(), None)
        .await
        .unwrap();

    // The mock has no content, so every query comes back empty.
    assert_eq!(outcome.stats.queries, 12);
    assert_eq!(outcome.stats.failed_queries, 12);
    assert!(outcome.degraded);
}
