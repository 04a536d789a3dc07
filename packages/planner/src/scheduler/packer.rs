//! Multi-day packing.

use std::collections::HashSet;

use chrono::Datelike;
use extraction::DayPlanSkeleton;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::allocator::{allocate_day, DayContext};
use super::score::is_available;
use crate::config::SchedulerConfig;
use crate::error::{Condition, PlannerError, Result};
use crate::models::{GeneratedDay, GeneratedSlot, Place, PlaceId, SlotKind, TripPreferences, Weekday};

#[derive(Debug, Clone, Default)]
pub struct PackOutcome {
    pub days: Vec<GeneratedDay>,
    pub conditions: Vec<Condition>,
    /// The deadline stopped packing before the last day.
    pub incomplete: bool,
}

/// Plan each day of the trip in order, never reusing a place across days
/// unless it is revisit-friendly.
///
/// The deadline is checked between days. Fails with
/// [`PlannerError::DeadlineExceeded`] only when no day could be packed.
/// The first day that binds no place, whether the pool ran dry or nothing
/// left in it was eligible, is reported as [`Condition::Exhausted`].
pub fn pack_days(
    prefs: &TripPreferences,
    config: &SchedulerConfig,
    pool: &[Place],
    skeleton: Option<&DayPlanSkeleton>,
    deadline: Option<Instant>,
) -> Result<PackOutcome> {
    config.validate()?;

    let mut outcome = PackOutcome::default();
    let mut used: HashSet<PlaceId> = HashSet::new();
    let mut exhausted_from: Option<u32> = None;

    for (index, date) in prefs.dates().enumerate() {
        let day_number = index as u32 + 1;

        if deadline.is_some_and(|at| Instant::now() >= at) {
            warn!(day_number, "Deadline reached while packing days");
            outcome.incomplete = true;
            break;
        }

        let weekday = Weekday::from(date.weekday());
        let outline = skeleton.and_then(|s| s.day(day_number));
        let ctx = DayContext {
            day_number,
            date,
            weekday,
            prefs,
            config,
            focus_zone: outline.and_then(|d| d.focus_zone.clone()),
        };

        let remaining = pool
            .iter()
            .filter(|p| is_available(p, &used, &HashSet::new()))
            .count();

        let plan = allocate_day(&ctx, pool, &used);
        if plan.bound_ids().next().is_none() && exhausted_from.is_none() {
            debug!(day_number, remaining, "No eligible place for any slot");
            exhausted_from = Some(day_number);
        }
        used.extend(plan.bound_ids());

        let summary = summarize(
            day_number,
            weekday,
            outline.and_then(|d| d.theme.as_deref()),
            plan.focus_zone.as_deref(),
            &plan.slots,
            remaining == 0,
        );

        debug!(
            day_number,
            slots = plan.slots.len(),
            physical = plan.physical_used,
            mental = plan.mental_used,
            "Packed day"
        );

        outcome.days.push(GeneratedDay {
            day_number,
            date,
            weekday,
            slots: plan.slots,
            summary,
        });
    }

    if outcome.days.is_empty() && outcome.incomplete {
        return Err(PlannerError::DeadlineExceeded);
    }
    if let Some(from_day) = exhausted_from {
        outcome.conditions.push(Condition::Exhausted { from_day });
    }
    if outcome.incomplete {
        outcome.conditions.push(Condition::DeadlineReached {
            packed_days: outcome.days.len() as u32,
        });
    }

    info!(
        requested = prefs.days,
        packed = outcome.days.len(),
        places_used = used.len(),
        "Packing finished"
    );

    Ok(outcome)
}

fn summarize(
    day_number: u32,
    weekday: Weekday,
    theme: Option<&str>,
    zone: Option<&str>,
    slots: &[GeneratedSlot],
    exhausted: bool,
) -> String {
    let mut summary = format!("Day {} ({})", day_number, capitalize(weekday.as_str()));
    if let Some(theme) = theme {
        summary.push_str(&format!(": {}", theme));
    }

    if exhausted {
        summary.push_str(". No unused places left; the day is open for free exploration.");
        return summary;
    }

    if let Some(zone) = zone {
        summary.push_str(&format!(", around {}", zone));
    }

    let highlights: Vec<&str> = slots
        .iter()
        .filter(|s| matches!(s.kind, SlotKind::Activity | SlotKind::Meal))
        .filter_map(|s| s.place.as_ref().map(|p| p.name()))
        .collect();

    if highlights.is_empty() {
        summary.push_str(". Nothing fit this day; enjoy it at your own pace.");
    } else {
        summary.push_str(&format!(". {}.", highlights.join(", ")));
    }
    summary
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
