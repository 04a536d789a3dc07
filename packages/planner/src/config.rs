//! Tunable planner configuration.
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a working configuration:
//!
//! ```rust
//! use planner::PlannerConfig;
//!
//! let config: PlannerConfig =
//!     serde_json::from_str(r#"{ "discovery": { "concurrency": 8 } }"#).unwrap();
//! assert_eq!(config.discovery.concurrency, 8);
//! assert_eq!(config.discovery.min_confidence, 0.5);
//! ```

use std::time::Duration;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::common::WalkingModel;
use crate::error::{PlannerError, Result};
use crate::models::{DayWindow, TripPreferences};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub discovery: DiscoveryConfig,
    pub scheduler: SchedulerConfig,
}

impl PlannerConfig {
    pub fn with_discovery(mut self, discovery: DiscoveryConfig) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.scheduler.validate()
    }
}

// ============================================================================
// Discovery
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Query phrasings per category.
    pub variants_per_category: usize,
    /// Results requested from the search provider per query.
    pub results_per_query: usize,
    /// Queries in flight at once.
    pub concurrency: usize,
    pub query_timeout_ms: u64,
    /// Content blocks are cut to this many characters.
    pub max_block_chars: usize,
    /// Each per-category corpus is cut to this many characters.
    pub max_corpus_chars: usize,
    /// Below this share of successful queries the run is degraded.
    pub min_success_ratio: f32,
    pub min_confidence: f32,
    /// Same-name candidates closer than this are one place.
    pub dedup_distance_m: f64,
    /// Attempts per reasoning call while rate limited.
    pub extraction_attempts: u32,
    pub retry_base_delay_ms: u64,
    /// Share of the overall deadline given to search dispatch.
    pub dispatch_share: f32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            variants_per_category: 2,
            results_per_query: 5,
            concurrency: 4,
            query_timeout_ms: 10_000,
            max_block_chars: 2_000,
            max_corpus_chars: 12_000,
            min_success_ratio: 0.5,
            min_confidence: 0.5,
            dedup_distance_m: 75.0,
            extraction_attempts: 3,
            retry_base_delay_ms: 500,
            dispatch_share: 0.6,
        }
    }
}

impl DiscoveryConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn with_variants_per_category(mut self, variants: usize) -> Self {
        self.variants_per_category = variants;
        self
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_max_block_chars(mut self, max: usize) -> Self {
        self.max_block_chars = max;
        self
    }
}

// ============================================================================
// Scheduler
// ============================================================================

/// Linear effort budget: `base + per_step * (rhythm - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffortBudget {
    pub physical_base: u32,
    pub physical_per_step: u32,
    pub mental_base: u32,
    pub mental_per_step: u32,
}

impl Default for EffortBudget {
    fn default() -> Self {
        Self {
            physical_base: 6,
            physical_per_step: 3,
            mental_base: 6,
            mental_per_step: 3,
        }
    }
}

impl EffortBudget {
    /// `(physical, mental)` allowance for one day at this rhythm.
    pub fn for_rhythm(&self, rhythm: u8) -> (u32, u32) {
        let steps = u32::from(rhythm.saturating_sub(1));
        (
            self.physical_base + self.physical_per_step * steps,
            self.mental_base + self.mental_per_step * steps,
        )
    }
}

/// Soft-score weights used to rank eligible places for a slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub local_secret: f32,
    pub tourist_trap: f32,
    pub overrated: f32,
    /// Multiplied by the traveler's weight for each matched interest.
    pub interest: f32,
    /// Scaled by `1 - |vibe - locality|`.
    pub locality: f32,
    /// Per crowd step above low, for slow rhythms only.
    pub crowd: f32,
    /// When the place type was already used twice that day.
    pub diversity: f32,
    pub focus_zone: f32,
    pub over_budget: f32,
    /// Clubs and bars when traveling with children.
    pub family_nightlife: f32,
    /// Restaurants over bars for meals.
    pub meal_restaurant: f32,
    /// Bars and clubs in the evening.
    pub evening_nightlife: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            local_secret: 2.0,
            tourist_trap: 2.0,
            overrated: 1.0,
            interest: 1.5,
            locality: 1.0,
            crowd: 0.5,
            diversity: 1.5,
            focus_zone: 1.0,
            over_budget: 1.0,
            family_nightlife: 3.0,
            meal_restaurant: 1.0,
            evening_nightlife: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub day_start: NaiveTime,
    pub day_end: NaiveTime,
    pub lunch_earliest: NaiveTime,
    pub lunch_latest: NaiveTime,
    pub dinner_earliest: NaiveTime,
    pub dinner_latest: NaiveTime,
    pub default_meal_minutes: u32,
    pub effort: EffortBudget,
    /// Activities per day are capped at `rhythm + extra_activities`.
    pub extra_activities: u32,
    /// Walks at least this long become explicit transfer slots.
    pub transfer_min_minutes: u32,
    /// Idle gap filled by a break when nothing fits and no meal is due.
    pub idle_break_minutes: u32,
    /// Bars are only scheduled as activities from this time.
    pub nightlife_from: NaiveTime,
    pub walking: WalkingModel,
    pub weights: ScoringWeights,
    pub max_alternatives: usize,
    pub max_upsells: usize,
    /// Share of the overall deadline the skeleton request may take.
    pub skeleton_share: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            day_start: hm(9, 0),
            day_end: hm(23, 0),
            lunch_earliest: hm(12, 30),
            lunch_latest: hm(14, 30),
            dinner_earliest: hm(19, 30),
            dinner_latest: hm(21, 30),
            default_meal_minutes: 75,
            effort: EffortBudget::default(),
            extra_activities: 1,
            transfer_min_minutes: 10,
            idle_break_minutes: 60,
            nightlife_from: hm(17, 0),
            walking: WalkingModel::default(),
            weights: ScoringWeights::default(),
            max_alternatives: 3,
            max_upsells: 2,
            skeleton_share: 0.5,
        }
    }
}

impl SchedulerConfig {
    /// Rejects windows that would leave a day with no slots and meal ranges
    /// that close before they open.
    pub fn validate(&self) -> Result<()> {
        if self.day_end <= self.day_start {
            return Err(PlannerError::invalid("scheduler day_end must be after day_start"));
        }
        if self.lunch_latest < self.lunch_earliest {
            return Err(PlannerError::invalid("scheduler lunch_latest is before lunch_earliest"));
        }
        if self.dinner_latest < self.dinner_earliest {
            return Err(PlannerError::invalid("scheduler dinner_latest is before dinner_earliest"));
        }
        if self.default_meal_minutes == 0 {
            return Err(PlannerError::invalid("scheduler default_meal_minutes must be positive"));
        }
        Ok(())
    }

    pub fn with_day_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.day_start = start;
        self.day_end = end;
        self
    }

    pub fn activities_per_day(&self, rhythm: u8) -> u32 {
        u32::from(rhythm) + self.extra_activities
    }

    /// The traveler's window if set, the configured one otherwise.
    pub fn window_for(&self, prefs: &TripPreferences) -> DayWindow {
        prefs
            .day_window
            .unwrap_or_else(|| DayWindow::new(self.day_start, self.day_end))
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_effort(mut self, effort: EffortBudget) -> Self {
        self.effort = effort;
        self
    }

    pub fn with_walking(mut self, walking: WalkingModel) -> Self {
        self.walking = walking;
        self
    }

    pub fn with_max_alternatives(mut self, max: usize) -> Self {
        self.max_alternatives = max;
        self
    }

    pub fn with_max_upsells(mut self, max: usize) -> Self {
        self.max_upsells = max;
        self
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN)
}
