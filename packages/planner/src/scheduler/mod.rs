//! Itinerary generation.
//!
//! The scheduler works on a fixed pool of places for one city: catalog
//! places plus any discovery candidates handed in. Days are packed one at a
//! time by a greedy slot allocator, then alternatives and upsells are
//! attached.
//!
//! ```rust,ignore
//! let planner = ItineraryPlanner::new(catalog).with_config(config.scheduler);
//! let outcome = planner
//!     .generate_itinerary(&prefs, GenerateOptions::default().with_candidates(found))
//!     .await?;
//! ```

pub mod allocator;
pub mod inject;
pub mod packer;
pub mod score;
pub mod skeleton;

use std::collections::HashSet;
use std::time::Duration;

use extraction::{DayPlanSkeleton, Extractor};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::catalog::PlaceCatalog;
use crate::config::SchedulerConfig;
use crate::error::{Condition, PlannerError, Result};
use crate::models::{
    CandidatePlace, City, GeneratedItinerary, ItineraryMeta, ItineraryOutcome, Place, TripPreferences,
};

pub use allocator::{allocate_day, DayContext, DayPlan};
pub use inject::inject;
pub use packer::{pack_days, PackOutcome};
pub use skeleton::fetch_skeleton;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Unpromoted discovery candidates to plan with alongside the catalog.
    pub candidates: Vec<CandidatePlace>,
    pub skeleton: Option<DayPlanSkeleton>,
    pub deadline: Option<Instant>,
}

impl GenerateOptions {
    pub fn with_candidates(mut self, candidates: Vec<CandidatePlace>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn with_skeleton(mut self, skeleton: DayPlanSkeleton) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

pub struct ItineraryPlanner<C> {
    catalog: C,
    config: SchedulerConfig,
}

impl<C: PlaceCatalog> ItineraryPlanner<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            config: SchedulerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub async fn generate_itinerary(
        &self,
        prefs: &TripPreferences,
        options: GenerateOptions,
    ) -> Result<ItineraryOutcome> {
        prefs.validate()?;
        self.config.validate()?;
        let (_, pool) = self.load_pool(prefs, &options.candidates).await?;
        self.plan(prefs, &pool, options.skeleton.as_ref(), options.deadline, Vec::new())
            .await
    }

    /// Like [`generate_itinerary`](Self::generate_itinerary), but first asks
    /// the extractor for a day-plan skeleton. A skeleton in `options` is
    /// replaced by the fetched one.
    ///
    /// With a deadline, the skeleton request gets `skeleton_share` of the
    /// time left; past that the itinerary is planned without it.
    pub async fn generate_with_skeleton<E>(
        &self,
        extractor: &E,
        prefs: &TripPreferences,
        options: GenerateOptions,
    ) -> Result<ItineraryOutcome>
    where
        E: Extractor + ?Sized,
    {
        prefs.validate()?;
        self.config.validate()?;
        let (city, pool) = self.load_pool(prefs, &options.candidates).await?;
        let fetch = fetch_skeleton(extractor, &city, prefs, &pool);
        let (skeleton, condition) = match options.deadline {
            Some(deadline) => {
                let cutoff = self.skeleton_deadline(deadline);
                match tokio::time::timeout_at(cutoff, fetch).await {
                    Ok(fetched) => fetched?,
                    Err(_) => {
                        warn!("Skeleton request timed out, inferring zones");
                        (
                            None,
                            Some(Condition::SkeletonUnavailable {
                                reason: "timed out".to_string(),
                            }),
                        )
                    }
                }
            }
            None => fetch.await?,
        };
        self.plan(
            prefs,
            &pool,
            skeleton.as_ref(),
            options.deadline,
            condition.into_iter().collect(),
        )
        .await
    }

    fn skeleton_deadline(&self, deadline: Instant) -> Instant {
        let now = Instant::now();
        let remaining = deadline.saturating_duration_since(now);
        let share = self.config.skeleton_share.clamp(0.0, 1.0) as f64;
        now + Duration::from_secs_f64(remaining.as_secs_f64() * share)
    }

    /// The city plus its catalog places and any candidates not already in
    /// the catalog under the same normalized name.
    async fn load_pool(
        &self,
        prefs: &TripPreferences,
        candidates: &[CandidatePlace],
    ) -> Result<(City, Vec<Place>)> {
        let city = self
            .catalog
            .city(prefs.city_id)
            .await?
            .ok_or(PlannerError::CityNotFound(prefs.city_id))?;

        let mut pool = self.catalog.places_for_city(prefs.city_id).await?;
        let mut names: HashSet<String> = pool.iter().map(|p| p.details.normalized_name()).collect();

        for candidate in candidates {
            if names.insert(candidate.details.normalized_name()) {
                pool.push(candidate.clone().into_place(prefs.city_id));
            }
        }

        info!(
            city = %city.name,
            pool = pool.len(),
            candidates = candidates.len(),
            "Loaded place pool"
        );
        Ok((city, pool))
    }

    async fn plan(
        &self,
        prefs: &TripPreferences,
        pool: &[Place],
        skeleton: Option<&DayPlanSkeleton>,
        deadline: Option<Instant>,
        mut conditions: Vec<Condition>,
    ) -> Result<ItineraryOutcome> {
        let products = self.catalog.products_for_city(prefs.city_id).await?;

        let mut packed = pack_days(prefs, &self.config, pool, skeleton, deadline)?;
        inject(&mut packed.days, &products, &self.config);
        conditions.extend(packed.conditions);

        let itinerary = GeneratedItinerary { days: packed.days };
        let meta = ItineraryMeta {
            places_used: itinerary.places_used(),
            produced_days: itinerary.days.len() as u32,
            requested_days: prefs.days,
            incomplete: packed.incomplete,
            conditions,
        };

        info!(
            city_id = %prefs.city_id,
            days = meta.produced_days,
            places_used = meta.places_used,
            incomplete = meta.incomplete,
            "Itinerary generated"
        );

        Ok(ItineraryOutcome { itinerary, meta })
    }
}
