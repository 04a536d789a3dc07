//! Slot eligibility and soft scoring.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::NaiveTime;

use crate::common::{locations_overlap, normalize_name};
use crate::config::SchedulerConfig;
use crate::models::{CrowdLevel, Place, PlaceId, PlaceType, TimeOfDay, TripPreferences, Weekday};

/// What a slot is being filled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotPurpose {
    Activity,
    Meal,
}

/// Hard constraints that do not depend on timing or effort.
pub fn is_available(place: &Place, used: &HashSet<PlaceId>, day_used: &HashSet<PlaceId>) -> bool {
    if day_used.contains(&place.id) {
        return false;
    }
    !used.contains(&place.id) || place.details.revisit_friendly
}

/// Whether the place type may fill this purpose at `start`.
pub fn type_allowed(place_type: PlaceType, purpose: SlotPurpose, start: NaiveTime, config: &SchedulerConfig) -> bool {
    match purpose {
        SlotPurpose::Meal => place_type.is_food(),
        SlotPurpose::Activity => match place_type {
            PlaceType::Restaurant => false,
            PlaceType::Bar => start >= config.nightlife_from,
            PlaceType::Club => matches!(TimeOfDay::of(start), TimeOfDay::Evening | TimeOfDay::Night),
            _ => true,
        },
    }
}

/// Best-days and best-times constraints. Empty sets allow everything.
pub fn timing_allowed(place: &Place, weekday: Weekday, start: NaiveTime) -> bool {
    let d = &place.details;
    (d.best_days.is_empty() || d.best_days.contains(&weekday))
        && (d.best_times.is_empty() || d.best_times.contains(&TimeOfDay::of(start)))
}

/// Inputs to the soft score that stay fixed within a slot decision.
pub struct ScoreContext<'a> {
    pub prefs: &'a TripPreferences,
    pub config: &'a SchedulerConfig,
    pub focus_zone: Option<&'a str>,
    pub type_counts: &'a HashMap<PlaceType, u32>,
    pub purpose: SlotPurpose,
    pub start: NaiveTime,
}

pub fn score(place: &Place, ctx: &ScoreContext<'_>) -> f32 {
    let w = &ctx.config.weights;
    let d = &place.details;
    let mut s = 0.0;

    if d.local_secret {
        s += w.local_secret;
    }
    if d.tourist_trap {
        s -= w.tourist_trap;
    }
    if d.overrated {
        s -= w.overrated;
    }

    s += w.interest * interest_match(place, ctx.prefs);

    if let (Some(target), Some(vibe)) = (ctx.prefs.locality, d.vibe_score) {
        s += w.locality * (1.0 - (vibe - target).abs());
    }

    if ctx.prefs.rhythm <= 2 {
        let steps = match d.crowd_level {
            Some(CrowdLevel::High) => 2.0,
            Some(CrowdLevel::Medium) => 1.0,
            _ => 0.0,
        };
        s -= w.crowd * steps;
    }

    if ctx.type_counts.get(&d.place_type).copied().unwrap_or(0) >= 2 {
        s -= w.diversity;
    }

    if let (Some(focus), Some(zone)) = (ctx.focus_zone, d.zone.as_deref()) {
        if locations_overlap(focus, zone) {
            s += w.focus_zone;
        }
    }

    if let (Some(budget), Some(price)) = (ctx.prefs.budget, d.price_range) {
        if budget.exceeded_by(price) {
            s -= w.over_budget;
        }
    }

    if ctx.prefs.traveling_with_children() && d.place_type.is_nightlife() {
        s -= w.family_nightlife;
    }

    match ctx.purpose {
        SlotPurpose::Meal if d.place_type == PlaceType::Restaurant => s += w.meal_restaurant,
        SlotPurpose::Activity if d.place_type.is_nightlife() && ctx.start >= ctx.config.nightlife_from => {
            s += w.evening_nightlife
        }
        _ => {}
    }

    s
}

/// Sum of the traveler's weights for every interest the place matches,
/// by tag or by type name.
fn interest_match(place: &Place, prefs: &TripPreferences) -> f32 {
    if prefs.interests.is_empty() {
        return 0.0;
    }
    let tags: HashSet<String> = place
        .details
        .why_people_go
        .iter()
        .map(|t| normalize_name(t))
        .chain(std::iter::once(place.details.place_type.as_str().to_string()))
        .collect();

    prefs
        .interests
        .iter()
        .filter(|(interest, _)| tags.contains(&normalize_name(interest)))
        .map(|(_, weight)| *weight)
        .sum()
}

/// Descending score, then name, then id, so picks are deterministic.
pub fn rank(a: (f32, &Place), b: (f32, &Place)) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| a.1.details.normalized_name().cmp(&b.1.details.normalized_name()))
        .then_with(|| a.1.id.cmp(&b.1.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CityId, PlaceDetails};
    use chrono::NaiveDate;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn prefs(rhythm: u8) -> TripPreferences {
        TripPreferences::new(CityId::new(), NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(), 1, rhythm)
    }

    fn place(details: PlaceDetails) -> Place {
        Place::new(CityId::new(), details)
    }

    #[test]
    fn test_type_rules() {
        let config = SchedulerConfig::default();
        assert!(!type_allowed(PlaceType::Restaurant, SlotPurpose::Activity, t(10, 0), &config));
        assert!(!type_allowed(PlaceType::Bar, SlotPurpose::Activity, t(15, 0), &config));
        assert!(type_allowed(PlaceType::Bar, SlotPurpose::Activity, t(18, 0), &config));
        assert!(!type_allowed(PlaceType::Club, SlotPurpose::Activity, t(16, 0), &config));
        assert!(type_allowed(PlaceType::Club, SlotPurpose::Activity, t(22, 0), &config));
        assert!(type_allowed(PlaceType::Bar, SlotPurpose::Meal, t(13, 0), &config));
        assert!(!type_allowed(PlaceType::View, SlotPurpose::Meal, t(13, 0), &config));
    }

    #[test]
    fn test_timing_constraints() {
        let market = place(
            PlaceDetails::new("Porta Portese", PlaceType::Experience)
                .with_best_days([Weekday::Sunday])
                .with_best_times([TimeOfDay::Morning]),
        );
        assert!(timing_allowed(&market, Weekday::Sunday, t(9, 0)));
        assert!(!timing_allowed(&market, Weekday::Saturday, t(9, 0)));
        assert!(!timing_allowed(&market, Weekday::Sunday, t(15, 0)));
    }

    #[test]
    fn test_score_prefers_local_secrets_and_interests() {
        let config = SchedulerConfig::default();
        let prefs = prefs(3).with_interest("art", 2.0);
        let counts = HashMap::new();
        let ctx = ScoreContext {
            prefs: &prefs,
            config: &config,
            focus_zone: None,
            type_counts: &counts,
            purpose: SlotPurpose::Activity,
            start: t(10, 0),
        };

        let trap = place(PlaceDetails::new("Trevi", PlaceType::Attraction).tourist_trap());
        let secret = place(PlaceDetails::new("Aventine Keyhole", PlaceType::View).local_secret());
        let gallery = place(PlaceDetails::new("Doria Pamphilj", PlaceType::Attraction).with_tags(["Art"]));

        assert!(score(&secret, &ctx) > score(&trap, &ctx));
        assert!((score(&gallery, &ctx) - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_revisit_friendly_only_once_per_day() {
        let piazza = place(PlaceDetails::new("Piazza Navona", PlaceType::Zone).revisit_friendly());
        let used: HashSet<_> = [piazza.id].into_iter().collect();
        assert!(is_available(&piazza, &used, &HashSet::new()));
        assert!(!is_available(&piazza, &used, &used));
    }
}
