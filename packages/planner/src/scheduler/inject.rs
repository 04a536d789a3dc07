//! Alternatives and upsell suggestions for filled slots.

use std::collections::HashSet;

use chrono::{NaiveTime, Timelike};

use crate::common::{locations_overlap, normalize_name};
use crate::config::SchedulerConfig;
use crate::models::{GeneratedDay, GeneratedSlot, Place, PlaceId, Product, SlotKind, TimeOfDay, UpsellSuggestion};

/// Trim each slot's alternatives to places not bound anywhere in the
/// itinerary, capped at `max_alternatives`, and attach ranked upsells.
/// Slot timing is never touched.
pub fn inject(days: &mut [GeneratedDay], products: &[Product], config: &SchedulerConfig) {
    let bound: HashSet<PlaceId> = days
        .iter()
        .flat_map(|d| d.slots.iter())
        .filter_map(|s| s.place_id())
        .collect();

    for slot in days.iter_mut().flat_map(|d| d.slots.iter_mut()) {
        if !matches!(slot.kind, SlotKind::Activity | SlotKind::Meal) {
            slot.alternatives.clear();
            continue;
        }

        slot.alternatives.retain(|alt| !bound.contains(&alt.id));
        slot.alternatives.truncate(config.max_alternatives);

        slot.upsells = match &slot.place {
            Some(place) => upsells_for(slot, place, products, config.max_upsells),
            None => Vec::new(),
        };
    }
}

fn upsells_for(slot: &GeneratedSlot, place: &Place, products: &[Product], max: usize) -> Vec<UpsellSuggestion> {
    let when = spanned_buckets(slot.start, slot.end);
    let tags: HashSet<String> = place.details.why_people_go.iter().map(|t| normalize_name(t)).collect();

    let mut ranked: Vec<(u32, &Product)> = products
        .iter()
        .filter_map(|product| relevance(product, place, &when, &tags).map(|r| (r, product)))
        .collect();

    ranked.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.title.cmp(&b.1.title)));

    ranked
        .into_iter()
        .take(max)
        .map(|(relevance, product)| UpsellSuggestion {
            product_id: product.id,
            title: product.title.clone(),
            price_cents: product.price_cents,
            relevance,
        })
        .collect()
}

/// Type match counts double, zone match and each shared tag count once.
/// Constraints a product sets (type, zone, time window) must hold.
fn relevance(product: &Product, place: &Place, when: &[TimeOfDay], tags: &HashSet<String>) -> Option<u32> {
    if !product.times.is_empty() && !product.times.iter().any(|t| when.contains(t)) {
        return None;
    }

    let type_match = match product.place_type {
        Some(t) if t == place.place_type() => 2,
        Some(_) => return None,
        None => 0,
    };

    let zone_match = match (product.zone.as_deref(), place.details.zone.as_deref()) {
        (Some(pz), Some(z)) if locations_overlap(pz, z) => 1,
        (Some(_), _) => return None,
        (None, _) => 0,
    };

    let tag_overlap = product
        .tags
        .iter()
        .filter(|t| tags.contains(&normalize_name(t)))
        .count() as u32;

    let total = type_match + zone_match + tag_overlap;
    (total > 0).then_some(total)
}

/// Every time-of-day bucket a slot touches, in order.
fn spanned_buckets(start: NaiveTime, end: NaiveTime) -> Vec<TimeOfDay> {
    let mut buckets = vec![TimeOfDay::of(start)];
    let hours = (start.hour() + 1..24).filter_map(|h| NaiveTime::from_hms_opt(h, 0, 0));
    for boundary in hours.take_while(|t| *t < end) {
        let bucket = TimeOfDay::of(boundary);
        if !buckets.contains(&bucket) {
            buckets.push(bucket);
        }
    }
    buckets
}
