//! Same-place detection and field-level merging.

use crate::common::locations_overlap;
use crate::models::{CandidatePlace, PlaceDetails};

/// Whether two records describe the same physical place.
///
/// Names must match after normalization. When both have coordinates they
/// must be within `threshold_m`. Otherwise any zone or address of one must
/// overlap any of the other; a record with no location text at all matches
/// on name alone.
pub fn is_same_place(a: &PlaceDetails, b: &PlaceDetails, threshold_m: f64) -> bool {
    if a.normalized_name() != b.normalized_name() {
        return false;
    }

    if let (Some(ca), Some(cb)) = (a.coordinates, b.coordinates) {
        return ca.distance_m(&cb) <= threshold_m;
    }

    let la = location_texts(a);
    let lb = location_texts(b);
    if la.is_empty() || lb.is_empty() {
        return true;
    }
    la.iter().any(|x| lb.iter().any(|y| locations_overlap(x, y)))
}

fn location_texts(details: &PlaceDetails) -> Vec<&str> {
    [details.zone.as_deref(), details.address.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Merge two records of the same place.
///
/// The more confident record wins field conflicts; its missing fields are
/// filled from the other. Tags and provenance are unioned and flags OR-ed.
pub fn merge(a: CandidatePlace, b: CandidatePlace) -> CandidatePlace {
    let a_wins = (a.confidence, a.corroboration()) >= (b.confidence, b.corroboration());
    let (mut base, other) = if a_wins { (a, b) } else { (b, a) };

    let d = &mut base.details;
    let o = other.details;

    d.zone = d.zone.take().or(o.zone);
    d.address = d.address.take().or(o.address);
    d.coordinates = d.coordinates.or(o.coordinates);
    d.suggested_stay = d.suggested_stay.or(o.suggested_stay);
    d.physical_effort = d.physical_effort.or(o.physical_effort);
    d.mental_effort = d.mental_effort.or(o.mental_effort);
    if d.best_days.is_empty() {
        d.best_days = o.best_days;
    }
    if d.best_times.is_empty() {
        d.best_times = o.best_times;
    }
    d.periods_to_avoid = d.periods_to_avoid.take().or(o.periods_to_avoid);
    d.tourist_trap |= o.tourist_trap;
    d.overrated |= o.overrated;
    d.local_secret |= o.local_secret;
    d.revisit_friendly |= o.revisit_friendly;
    d.why_people_go.extend(o.why_people_go);
    d.crowd_level = d.crowd_level.or(o.crowd_level);
    d.vibe_score = d.vibe_score.or(o.vibe_score);
    d.price_range = d.price_range.or(o.price_range);
    d.setting = d.setting.or(o.setting);
    if d.place_type.is_food() {
        d.cuisine_type = d.cuisine_type.take().or(o.cuisine_type);
    }
    d.local_description = d.local_description.take().or(o.local_description);
    d.warning = d.warning.take().or(o.warning);

    base.provenance.extend(other.provenance);
    base
}

/// Collapse duplicates until no two remaining records match.
///
/// Merging can fill in a zone or coordinates that make a record match one
/// it did not match before, so passes repeat until nothing changes. The
/// result contains no matching pair, which makes this idempotent.
pub fn deduplicate(candidates: Vec<CandidatePlace>, threshold_m: f64) -> Vec<CandidatePlace> {
    let mut pool = candidates;
    loop {
        let before = pool.len();
        let mut merged: Vec<CandidatePlace> = Vec::with_capacity(before);

        for candidate in pool {
            match merged
                .iter_mut()
                .find(|m| is_same_place(&m.details, &candidate.details, threshold_m))
            {
                Some(existing) => *existing = merge(existing.clone(), candidate),
                None => merged.push(candidate),
            }
        }

        pool = merged;
        if pool.len() == before {
            return pool;
        }
    }
}
