//! Integration tests for itinerary generation.
//!
//! These verify, through `ItineraryPlanner` and an in-memory catalog:
//! 1. Meals land on restaurants and activities on sights
//! 2. No place is used twice unless it is revisit-friendly
//! 3. Effort budgets, best days and day windows hold
//! 4. Skeleton focus zones, upsells and candidate pools flow through

use std::collections::HashSet;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use extraction::{DayPlanSkeleton, MockExtractor, MockFailure, SkeletonDay};
use planner::models::{TimeOfDay, Weekday};
use planner::{
    CandidatePlace, City, CityId, Condition, GenerateOptions, ItineraryPlanner, MemoryCatalog, Place,
    PlaceCatalog, PlaceDetails, PlaceType, PlannerError, Product, SchedulerConfig, SlotKind,
    TripPreferences,
};
use tokio::time::Instant;

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Friday.
fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 1).unwrap()
}

/// Helper to create a catalog with one city and the given places.
async fn setup_catalog(places: Vec<PlaceDetails>) -> (MemoryCatalog, City) {
    let catalog = MemoryCatalog::new();
    let city = catalog.upsert_city(City::new("Rome", "Italy")).await.unwrap();
    for details in places {
        catalog.upsert_place(Place::new(city.id, details)).await.unwrap();
    }
    (catalog, city)
}

fn rome_sample() -> Vec<PlaceDetails> {
    vec![
        PlaceDetails::new("Da Enzo", PlaceType::Restaurant),
        PlaceDetails::new("Roscioli", PlaceType::Restaurant),
        PlaceDetails::new("Colosseum", PlaceType::Attraction),
        PlaceDetails::new("Pantheon", PlaceType::Attraction),
        PlaceDetails::new("Bar Del Fico", PlaceType::Bar),
        PlaceDetails::new("Pincio Terrace", PlaceType::View),
    ]
}

#[tokio::test]
async fn test_single_day_from_small_pool() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 1, 3);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.itinerary.days.len(), 1);
    let day = &outcome.itinerary.days[0];

    let lunch = day
        .slots
        .iter()
        .find(|s| s.kind == SlotKind::Meal && s.start >= t(12, 30) && s.start <= t(14, 30))
        .expect("lunch slot");
    assert_eq!(lunch.place.as_ref().unwrap().place_type(), PlaceType::Restaurant);

    let sights = day
        .activities()
        .filter_map(|s| s.place.as_ref())
        .filter(|p| matches!(p.place_type(), PlaceType::Attraction | PlaceType::View))
        .count();
    assert!(sights >= 2, "expected at least two sights, got {}", sights);

    let ids: Vec<_> = day.bound_places().map(|p| p.id).collect();
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(ids.len(), unique.len());

    let config = SchedulerConfig::default();
    let (physical, mental) = config.effort.for_rhythm(3);
    let bound: Vec<&Place> = day.activities().filter_map(|s| s.place.as_ref()).collect();
    let used_physical: u32 = bound.iter().map(|p| u32::from(p.details.physical())).sum();
    let used_mental: u32 = bound.iter().map(|p| u32::from(p.details.mental())).sum();
    assert!(used_physical <= physical);
    assert!(used_mental <= mental);

    assert!(!outcome.meta.incomplete);
    assert_eq!(outcome.meta.produced_days, 1);
    assert_eq!(outcome.meta.places_used, ids.len());
}

#[tokio::test]
async fn test_slots_tile_the_day_window() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 2, 2).with_day_window(t(10, 0), t(22, 0));

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    for day in &outcome.itinerary.days {
        assert_eq!(day.slots.first().unwrap().start, t(10, 0));
        assert_eq!(day.slots.last().unwrap().end, t(22, 0));
        for pair in day.slots.windows(2) {
            assert_eq!(pair[0].end, pair[1].start, "gap in day {}", day.day_number);
        }
        for slot in &day.slots {
            assert!(slot.start < slot.end);
        }
    }
}

#[tokio::test]
async fn test_no_place_repeats_across_days() {
    let mut places = rome_sample();
    places.push(PlaceDetails::new("Villa Borghese", PlaceType::Attraction));
    places.push(PlaceDetails::new("Trevi Fountain", PlaceType::Attraction));
    places.push(PlaceDetails::new("Armando al Pantheon", PlaceType::Restaurant));
    let (catalog, city) = setup_catalog(places).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 3, 3);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    let mut seen = HashSet::new();
    for slot in outcome.itinerary.slots() {
        if let Some(id) = slot.place_id() {
            assert!(seen.insert(id), "place used twice");
        }
    }
    assert_eq!(outcome.meta.places_used, seen.len());
}

#[tokio::test]
async fn test_revisit_friendly_place_may_return_on_later_days() {
    let (catalog, city) = setup_catalog(vec![
        PlaceDetails::new("Piazza Navona", PlaceType::Attraction).revisit_friendly(),
    ])
    .await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 2, 3);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    for day in &outcome.itinerary.days {
        let visits = day.bound_places().filter(|p| p.name() == "Piazza Navona").count();
        assert_eq!(visits, 1, "day {}", day.day_number);
    }
}

#[tokio::test]
async fn test_best_days_are_respected() {
    let mut places: Vec<PlaceDetails> = ["Capitoline Museums", "Baths of Caracalla", "Ara Pacis"]
        .into_iter()
        .map(|name| PlaceDetails::new(name, PlaceType::Attraction))
        .collect();
    places.push(
        PlaceDetails::new("Porta Portese Market", PlaceType::Experience)
            .with_best_days([Weekday::Sunday])
            .with_best_times([TimeOfDay::Morning])
            .local_secret(),
    );
    let (catalog, city) = setup_catalog(places).await;
    let planner = ItineraryPlanner::new(catalog);
    // Friday, Saturday, Sunday.
    let prefs = TripPreferences::new(city.id, start_date(), 3, 1);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    for day in &outcome.itinerary.days {
        for place in day.bound_places() {
            let days = &place.details.best_days;
            assert!(days.is_empty() || days.contains(&day.weekday));
        }
    }

    let sunday = &outcome.itinerary.days[2];
    assert_eq!(sunday.weekday, Weekday::Sunday);
    let first = sunday.activities().next().unwrap();
    assert_eq!(first.place.as_ref().unwrap().name(), "Porta Portese Market");
}

#[tokio::test]
async fn test_empty_pool_yields_open_days() {
    let (catalog, city) = setup_catalog(Vec::new()).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 2, 3);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.itinerary.days.len(), 2);
    assert_eq!(outcome.meta.places_used, 0);
    assert!(outcome
        .itinerary
        .slots()
        .all(|s| s.kind == SlotKind::Break && s.place.is_none()));
    assert!(outcome.meta.conditions.contains(&Condition::Exhausted { from_day: 1 }));
}

#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let planner = ItineraryPlanner::new(MemoryCatalog::new());
    let prefs = TripPreferences::new(CityId::new(), start_date(), 1, 3);

    let result = planner.generate_itinerary(&prefs, GenerateOptions::default()).await;
    assert!(matches!(result, Err(PlannerError::CityNotFound(_))));
}

#[tokio::test]
async fn test_invalid_preferences_are_rejected() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let planner = ItineraryPlanner::new(catalog);

    let zero_days = TripPreferences::new(city.id, start_date(), 0, 3);
    let bad_rhythm = TripPreferences::new(city.id, start_date(), 2, 9);

    for prefs in [zero_days, bad_rhythm] {
        let result = planner.generate_itinerary(&prefs, GenerateOptions::default()).await;
        assert!(matches!(result, Err(PlannerError::InputInvalid(_))));
    }
}

#[tokio::test]
async fn test_expired_deadline_fails() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 2, 3);

    let result = planner
        .generate_itinerary(&prefs, GenerateOptions::default().with_deadline(Instant::now()))
        .await;
    assert!(matches!(result, Err(PlannerError::DeadlineExceeded)));
}

#[tokio::test]
async fn test_candidates_join_the_pool_without_duplicates() {
    let (catalog, city) = setup_catalog(vec![PlaceDetails::new("Pantheon", PlaceType::Attraction)]).await;
    let catalog_pantheon = catalog.places_for_city(city.id).await.unwrap().remove(0);
    let planner = ItineraryPlanner::new(catalog);

    let candidates = vec![
        CandidatePlace::new(PlaceDetails::new("pantheon", PlaceType::Attraction), 0.9),
        CandidatePlace::new(PlaceDetails::new("Roscioli", PlaceType::Restaurant), 0.8),
    ];
    let prefs = TripPreferences::new(city.id, start_date(), 1, 3);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default().with_candidates(candidates))
        .await
        .unwrap();

    let day = &outcome.itinerary.days[0];
    let pantheons: Vec<_> = day.bound_places().filter(|p| p.details.normalized_name() == "pantheon").collect();
    assert_eq!(pantheons.len(), 1);
    assert_eq!(pantheons[0].id, catalog_pantheon.id);
    assert!(day
        .slots
        .iter()
        .any(|s| s.kind == SlotKind::Meal && s.place.as_ref().is_some_and(|p| p.name() == "Roscioli")));
    // Scheduling never writes candidates back.
    assert_eq!(planner.catalog().place_count().await, 1);
}

#[tokio::test]
async fn test_skeleton_focus_zone_steers_the_day() {
    let places = vec![
        PlaceDetails::new("Alpha Church", PlaceType::Attraction).with_zone("Trastevere"),
        PlaceDetails::new("Zeta Gallery", PlaceType::Attraction).with_zone("Monti"),
    ];
    let (catalog, city) = setup_catalog(places).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 1, 3);

    let plain = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();
    let first = plain.itinerary.days[0].activities().next().unwrap();
    assert_eq!(first.place.as_ref().unwrap().name(), "Alpha Church");

    let extractor = MockExtractor::new().with_skeleton(DayPlanSkeleton {
        days: vec![SkeletonDay {
            day_number: 1,
            focus_zone: Some("Monti".into()),
            theme: Some("Hills and galleries".into()),
        }],
    });
    let steered = planner
        .generate_with_skeleton(&extractor, &prefs, GenerateOptions::default())
        .await
        .unwrap();

    let day = &steered.itinerary.days[0];
    let first = day.activities().next().unwrap();
    assert_eq!(first.place.as_ref().unwrap().name(), "Zeta Gallery");
    assert!(day.summary.contains("Hills and galleries"));
    assert!(steered.meta.conditions.is_empty());
}

#[tokio::test]
async fn test_skeleton_failure_still_produces_itinerary() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 1, 3);
    let extractor = MockExtractor::new().with_failure(MockFailure::Malformed);

    let outcome = planner
        .generate_with_skeleton(&extractor, &prefs, GenerateOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome.itinerary.days.len(), 1);
    assert!(outcome
        .meta
        .conditions
        .iter()
        .any(|c| matches!(c, Condition::SkeletonUnavailable { .. })));
}

#[tokio::test]
async fn test_slow_skeleton_is_abandoned_within_deadline() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 2, 3);
    let extractor = MockExtractor::new().with_skeleton_delay(Duration::from_secs(5));

    let started = Instant::now();
    let outcome = planner
        .generate_with_skeleton(
            &extractor,
            &prefs,
            GenerateOptions::default().with_deadline(started + Duration::from_millis(400)),
        )
        .await
        .unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(outcome.itinerary.days.len(), 2);
    assert!(!outcome.meta.incomplete);
    assert!(outcome
        .meta
        .conditions
        .iter()
        .any(|c| matches!(c, Condition::SkeletonUnavailable { .. })));
}

#[tokio::test]
async fn test_inverted_scheduler_window_is_input_invalid() {
    let (catalog, city) = setup_catalog(rome_sample()).await;
    let config = SchedulerConfig::default().with_day_window(t(22, 0), t(9, 0));
    let planner = ItineraryPlanner::new(catalog).with_config(config);
    let prefs = TripPreferences::new(city.id, start_date(), 1, 3);

    let result = planner.generate_itinerary(&prefs, GenerateOptions::default()).await;
    assert!(matches!(result, Err(PlannerError::InputInvalid(_))));
}

#[tokio::test]
async fn test_upsells_attach_to_matching_slots() {
    let (catalog, city) = setup_catalog(vec![
        PlaceDetails::new("Colosseum", PlaceType::Attraction),
        PlaceDetails::new("Roscioli", PlaceType::Restaurant),
    ])
    .await;
    catalog
        .insert_product(
            Product::new(city.id, "Skip-the-line Colosseum tour")
                .for_type(PlaceType::Attraction)
                .with_price_cents(4500),
        )
        .await;
    catalog
        .insert_product(Product::new(city.id, "Night kayak").for_type(PlaceType::Experience))
        .await;
    let planner = ItineraryPlanner::new(catalog);
    let prefs = TripPreferences::new(city.id, start_date(), 1, 3);

    let outcome = planner
        .generate_itinerary(&prefs, GenerateOptions::default())
        .await
        .unwrap();

    let colosseum = outcome
        .itinerary
        .slots()
        .find(|s| s.place.as_ref().is_some_and(|p| p.name() == "Colosseum"))
        .unwrap();
    let titles: Vec<_> = colosseum.upsells.iter().map(|u| u.title.as_str()).collect();
    assert_eq!(titles, vec!["Skip-the-line Colosseum tour"]);

    let roscioli = outcome
        .itinerary
        .slots()
        .find(|s| s.place.as_ref().is_some_and(|p| p.name() == "Roscioli"))
        .unwrap();
    assert!(roscioli.upsells.is_empty());
}
