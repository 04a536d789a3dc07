//! Generated itineraries. Immutable once built.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::place::{Place, PlaceId, PlaceRef, Weekday};
use super::product::UpsellSuggestion;
use crate::error::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    Activity,
    Meal,
    Break,
    Transfer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedSlot {
    pub kind: SlotKind,
    pub start: NaiveTime,
    pub end: NaiveTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<Place>,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternatives: Vec<PlaceRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub walking_minutes_to_next: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upsells: Vec<UpsellSuggestion>,
}

impl GeneratedSlot {
    pub fn new(kind: SlotKind, start: NaiveTime, end: NaiveTime, rationale: impl Into<String>) -> Self {
        Self {
            kind,
            start,
            end,
            place: None,
            rationale: rationale.into(),
            alternatives: Vec::new(),
            walking_minutes_to_next: None,
            upsells: Vec::new(),
        }
    }

    pub fn with_place(mut self, place: Place) -> Self {
        self.place = Some(place);
        self
    }

    pub fn place_id(&self) -> Option<PlaceId> {
        self.place.as_ref().map(|p| p.id)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedDay {
    pub day_number: u32,
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub slots: Vec<GeneratedSlot>,
    pub summary: String,
}

impl GeneratedDay {
    /// Slots with a place bound to them.
    pub fn bound_places(&self) -> impl Iterator<Item = &Place> {
        self.slots.iter().filter_map(|s| s.place.as_ref())
    }

    pub fn activities(&self) -> impl Iterator<Item = &GeneratedSlot> {
        self.slots.iter().filter(|s| s.kind == SlotKind::Activity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedItinerary {
    pub days: Vec<GeneratedDay>,
}

impl GeneratedItinerary {
    pub fn slots(&self) -> impl Iterator<Item = &GeneratedSlot> {
        self.days.iter().flat_map(|d| d.slots.iter())
    }

    /// Distinct places bound anywhere in the itinerary.
    pub fn places_used(&self) -> usize {
        let mut ids: Vec<PlaceId> = self.slots().filter_map(|s| s.place_id()).collect();
        ids.sort();
        ids.dedup();
        ids.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItineraryMeta {
    pub places_used: usize,
    pub produced_days: u32,
    pub requested_days: u32,
    /// Set when the deadline stopped packing early.
    pub incomplete: bool,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItineraryOutcome {
    pub itinerary: GeneratedItinerary,
    pub meta: ItineraryMeta,
}
