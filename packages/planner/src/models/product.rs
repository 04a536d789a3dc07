//! Bookable products offered next to itinerary slots.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::place::{CityId, PlaceType, TimeOfDay};
use crate::common::Id;

pub type ProductId = Id<Product>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub city_id: CityId,
    pub title: String,
    /// Place type this product pairs with, if any.
    #[serde(default)]
    pub place_type: Option<PlaceType>,
    #[serde(default)]
    pub zone: Option<String>,
    /// Empty means any time.
    #[serde(default)]
    pub times: BTreeSet<TimeOfDay>,
    /// Price in minor currency units.
    #[serde(default)]
    pub price_cents: u32,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl Product {
    pub fn new(city_id: CityId, title: impl Into<String>) -> Self {
        Self {
            id: ProductId::new(),
            city_id,
            title: title.into(),
            place_type: None,
            zone: None,
            times: BTreeSet::new(),
            price_cents: 0,
            tags: BTreeSet::new(),
        }
    }

    pub fn for_type(mut self, place_type: PlaceType) -> Self {
        self.place_type = Some(place_type);
        self
    }

    pub fn in_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn at_times(mut self, times: impl IntoIterator<Item = TimeOfDay>) -> Self {
        self.times = times.into_iter().collect();
        self
    }

    pub fn with_price_cents(mut self, price_cents: u32) -> Self {
        self.price_cents = price_cents;
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// A product attached to a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpsellSuggestion {
    pub product_id: ProductId,
    pub title: String,
    pub price_cents: u32,
    pub relevance: u32,
}
