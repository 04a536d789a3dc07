//! Travel Planner Core
//!
//! Discovers candidate places for a city from web search and a reasoning
//! service, and turns a pool of places into a day-by-day itinerary that
//! respects the traveler's pace, effort budget and meal times.
//!
//! # Usage
//!
//! ```rust,ignore
//! use planner::{DiscoveryPipeline, DiscoveryRequest, ItineraryPlanner, GenerateOptions};
//!
//! let discovery = DiscoveryPipeline::new(searcher, extractor);
//! let found = discovery.discover(&request, &cancel, Some(deadline)).await?;
//!
//! let planner = ItineraryPlanner::new(catalog);
//! let outcome = planner
//!     .generate_itinerary(&prefs, GenerateOptions::default().with_candidates(found.candidates))
//!     .await?;
//! ```
//!
//! # Modules
//!
//! - [`models`] - Places, cities, preferences, itineraries
//! - [`discovery`] - Query generation, dispatch, extraction, dedup, ranking
//! - [`scheduler`] - Slot allocation, day packing, alternatives and upsells
//! - [`catalog`] - `PlaceCatalog` with in-memory and Postgres stores
//! - [`config`] - Tunable weights, budgets and limits

pub mod catalog;
pub mod common;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod scheduler;

pub use catalog::{MemoryCatalog, PlaceCatalog};
#[cfg(feature = "postgres")]
pub use catalog::PostgresCatalog;
pub use config::{DiscoveryConfig, EffortBudget, PlannerConfig, SchedulerConfig, ScoringWeights};
pub use discovery::{promote, DiscoveryOutcome, DiscoveryPipeline, DiscoveryRequest, DiscoveryStats};
pub use error::{Condition, PlannerError, Result};
pub use models::{
    CandidatePlace, City, CityId, GeneratedDay, GeneratedItinerary, GeneratedSlot, ItineraryMeta,
    ItineraryOutcome, Place, PlaceDetails, PlaceId, PlaceType, Product, SlotKind, TripPreferences,
};
pub use scheduler::{GenerateOptions, ItineraryPlanner};
