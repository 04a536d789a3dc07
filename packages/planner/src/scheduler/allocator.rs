//! Greedy slot allocation for a single day.
//!
//! The clock runs in minutes from midnight across the day window. Meals are
//! taken as soon as their earliest start is reached; between meals the
//! highest-scoring eligible activity that finishes before the next meal is
//! placed. When nothing fits, a break covers the gap, so slots always tile
//! the window without holes.

use std::collections::{HashMap, HashSet};

use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::debug;

use super::score::{is_available, rank, score, timing_allowed, type_allowed, ScoreContext, SlotPurpose};
use crate::common::{locations_overlap, Coordinates};
use crate::config::SchedulerConfig;
use crate::models::{
    GeneratedSlot, Place, PlaceId, PlaceType, SlotKind, TripPreferences, Weekday,
};

/// Everything the allocator needs to know about the day being planned.
pub struct DayContext<'a> {
    pub day_number: u32,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub prefs: &'a TripPreferences,
    pub config: &'a SchedulerConfig,
    /// From the skeleton when there is one.
    pub focus_zone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DayPlan {
    pub slots: Vec<GeneratedSlot>,
    /// Zone the day gravitated around, if any.
    pub focus_zone: Option<String>,
    pub physical_used: u32,
    pub mental_used: u32,
}

impl DayPlan {
    pub fn bound_ids(&self) -> impl Iterator<Item = PlaceId> + '_ {
        self.slots.iter().filter_map(|s| s.place_id())
    }
}

#[derive(Debug, Clone, Copy)]
struct Meal {
    label: &'static str,
    earliest: u32,
    latest: u32,
}

struct Pick<'p> {
    place: &'p Place,
    walk: u32,
    duration: u32,
    alternatives: Vec<&'p Place>,
}

struct DayState {
    clock: u32,
    end: u32,
    physical_left: u32,
    mental_left: u32,
    activities: u32,
    type_counts: HashMap<PlaceType, u32>,
    day_used: HashSet<PlaceId>,
    /// Index of the last slot with a place, and that place's coordinates.
    last_bound: Option<(usize, Option<Coordinates>)>,
    focus_zone: Option<String>,
    slots: Vec<GeneratedSlot>,
}

/// Plan one day from `pool`, skipping places in `used` unless they are
/// revisit-friendly.
pub fn allocate_day(ctx: &DayContext<'_>, pool: &[Place], used: &HashSet<PlaceId>) -> DayPlan {
    let config = ctx.config;
    let window = config.window_for(ctx.prefs);
    let start = minutes(window.start);
    let end = minutes(window.end);
    let (physical_budget, mental_budget) = config.effort.for_rhythm(ctx.prefs.rhythm);
    let activity_cap = config.activities_per_day(ctx.prefs.rhythm);

    let meals: Vec<Meal> = [
        ("lunch", config.lunch_earliest, config.lunch_latest),
        ("dinner", config.dinner_earliest, config.dinner_latest),
    ]
    .into_iter()
    .map(|(label, earliest, latest)| Meal {
        label,
        earliest: minutes(earliest).max(start),
        latest: minutes(latest),
    })
    .filter(|m| m.latest >= m.earliest && m.earliest < end)
    .collect();
    let mut next_meal = 0usize;

    let mut state = DayState {
        clock: start,
        end,
        physical_left: physical_budget,
        mental_left: mental_budget,
        activities: 0,
        type_counts: HashMap::new(),
        day_used: HashSet::new(),
        last_bound: None,
        focus_zone: ctx.focus_zone.clone(),
        slots: Vec::new(),
    };

    while state.clock < state.end {
        let pending = meals.get(next_meal).copied();

        if let Some(meal) = pending.filter(|m| state.clock >= m.earliest) {
            next_meal += 1;
            match pick(ctx, pool, used, &state, SlotPurpose::Meal, meal.latest) {
                Some(choice) => {
                    let rationale = format!("{} at {}", capitalize(meal.label), choice.place.name());
                    bind(&mut state, ctx, SlotKind::Meal, choice, rationale);
                }
                None => {
                    let until = (state.clock + config.default_meal_minutes).min(state.end);
                    push_break(
                        &mut state,
                        until,
                        format!("No eligible place for {}; free time to eat nearby", meal.label),
                    );
                }
            }
            continue;
        }

        // Activities must wrap up before the next meal may start.
        let limit = pending.map(|m| m.earliest).unwrap_or(state.end);

        if state.activities < activity_cap {
            if let Some(choice) = pick(ctx, pool, used, &state, SlotPurpose::Activity, limit) {
                let rationale = activity_rationale(choice.place, state.focus_zone.as_deref());
                bind(&mut state, ctx, SlotKind::Activity, choice, rationale);
                continue;
            }
        }

        let until = match pending {
            Some(meal) => meal.earliest,
            None => (state.clock + config.idle_break_minutes.max(1)).min(state.end),
        };
        push_break(&mut state, until, "Free time".to_string());
    }

    DayPlan {
        slots: state.slots,
        focus_zone: state.focus_zone,
        physical_used: physical_budget - state.physical_left,
        mental_used: mental_budget - state.mental_left,
    }
}

/// Best eligible place for the next slot. Activities must end by `limit`;
/// meals must start by it.
fn pick<'p>(
    ctx: &DayContext<'_>,
    pool: &'p [Place],
    used: &HashSet<PlaceId>,
    state: &DayState,
    purpose: SlotPurpose,
    limit: u32,
) -> Option<Pick<'p>> {
    let config = ctx.config;
    let from = state.last_bound.and_then(|(_, coords)| coords);
    let has_previous = state.last_bound.is_some();

    let score_ctx = ScoreContext {
        prefs: ctx.prefs,
        config,
        focus_zone: state.focus_zone.as_deref(),
        type_counts: &state.type_counts,
        purpose,
        start: to_time(state.clock),
    };

    let mut eligible: Vec<(f32, &Place, u32, u32)> = pool
        .iter()
        .filter(|p| is_available(p, used, &state.day_used))
        .filter_map(|p| {
            let walk = if has_previous {
                config.walking.minutes_between(from, p.details.coordinates)
            } else {
                0
            };
            let begin = state.clock + walk;
            // Constraints hold at the start the slot will carry, which is
            // the current clock when the walk gets folded in.
            let slot_start = if folds_walk(walk, config) { state.clock } else { begin };
            let start_time = to_time(slot_start);
            if !type_allowed(p.place_type(), purpose, start_time, config) {
                return None;
            }
            if !timing_allowed(p, ctx.weekday, start_time) {
                return None;
            }

            let duration = match purpose {
                SlotPurpose::Meal => p
                    .details
                    .suggested_stay
                    .map(|s| s.minutes())
                    .unwrap_or(config.default_meal_minutes),
                SlotPurpose::Activity => p.details.stay_minutes(),
            };
            let finish = begin + duration;
            if finish > state.end {
                return None;
            }

            match purpose {
                SlotPurpose::Meal => {
                    if begin > limit {
                        return None;
                    }
                }
                SlotPurpose::Activity => {
                    if finish > limit {
                        return None;
                    }
                    if u32::from(p.details.physical()) > state.physical_left
                        || u32::from(p.details.mental()) > state.mental_left
                    {
                        return None;
                    }
                }
            }

            Some((score(p, &score_ctx), p, walk, duration))
        })
        .collect();

    eligible.sort_by(|a, b| rank((a.0, a.1), (b.0, b.1)));

    let mut ranked = eligible.into_iter();
    let (best_score, place, walk, duration) = ranked.next()?;
    debug!(
        place = %place.name(),
        score = best_score,
        walk,
        at = %to_time(state.clock),
        "Picked place for slot"
    );

    Some(Pick {
        place,
        walk,
        duration,
        alternatives: ranked.map(|(_, p, _, _)| p).collect(),
    })
}

fn bind(state: &mut DayState, ctx: &DayContext<'_>, kind: SlotKind, choice: Pick<'_>, rationale: String) {
    let place = choice.place;

    if let Some((index, _)) = state.last_bound {
        if let Some(previous) = state.slots.get_mut(index) {
            previous.walking_minutes_to_next = Some(choice.walk);
        }
    }

    // Short walks are folded into the slot so the day stays contiguous.
    let (begin, folded_walk) = if !folds_walk(choice.walk, ctx.config) {
        let arrive = (state.clock + choice.walk).min(state.end);
        state.slots.push(GeneratedSlot::new(
            SlotKind::Transfer,
            to_time(state.clock),
            to_time(arrive),
            format!("Walk to {} (about {} min)", place.name(), choice.walk),
        ));
        (arrive, 0)
    } else {
        (state.clock, choice.walk)
    };
    let finish = (begin + folded_walk + choice.duration).min(state.end);

    let mut slot = GeneratedSlot::new(kind, to_time(begin), to_time(finish), rationale).with_place(place.clone());
    slot.alternatives = choice.alternatives.iter().map(|p| p.to_ref()).collect();
    state.slots.push(slot);

    state.last_bound = Some((state.slots.len() - 1, place.details.coordinates));
    state.day_used.insert(place.id);
    *state.type_counts.entry(place.place_type()).or_insert(0) += 1;
    if kind == SlotKind::Activity {
        state.activities += 1;
        state.physical_left -= u32::from(place.details.physical());
        state.mental_left -= u32::from(place.details.mental());
    }
    if state.focus_zone.is_none() {
        state.focus_zone = place.details.zone.clone();
    }
    state.clock = finish;
}

/// Walks shorter than a transfer are folded into the slot they lead to.
fn folds_walk(walk: u32, config: &SchedulerConfig) -> bool {
    walk == 0 || walk < config.transfer_min_minutes
}

fn push_break(state: &mut DayState, until: u32, rationale: String) {
    let until = until.clamp(state.clock + 1, state.end.max(state.clock + 1));
    if let Some(last) = state.slots.last_mut() {
        if last.kind == SlotKind::Break && last.rationale == rationale && minutes(last.end) == state.clock {
            last.end = to_time(until);
            state.clock = until;
            return;
        }
    }
    state
        .slots
        .push(GeneratedSlot::new(SlotKind::Break, to_time(state.clock), to_time(until), rationale));
    state.clock = until;
}

fn activity_rationale(place: &Place, focus_zone: Option<&str>) -> String {
    let d = &place.details;
    let mut reason = match d.local_description.as_deref() {
        Some(desc) => format!("{}: {}", place.name(), desc),
        None => format!("Visit {}", place.name()),
    };
    if d.local_secret {
        reason.push_str(" (local favorite)");
    }
    if let (Some(zone), Some(focus)) = (d.zone.as_deref(), focus_zone) {
        if locations_overlap(zone, focus) {
            reason.push_str(&format!(", in {}", zone));
        }
    }
    reason
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn minutes(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

pub(crate) fn to_time(minutes: u32) -> NaiveTime {
    let minutes = minutes.min(24 * 60 - 1);
    NaiveTime::from_hms_opt(minutes / 60, minutes % 60, 0).unwrap_or(NaiveTime::MIN)
}
