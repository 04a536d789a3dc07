//! Discovery output before promotion into the catalog.

use std::collections::BTreeSet;

use extraction::ExtractedPlace;
use serde::{Deserialize, Serialize};

use super::place::{CityId, Place, PlaceDetails, PlaceType};
use crate::common::Coordinates;

/// A place found by discovery that is not (yet) in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidatePlace {
    #[serde(flatten)]
    pub details: PlaceDetails,
    /// Extractor-reported confidence in 0-1.
    pub confidence: f32,
    /// Search queries (or category labels) whose results mentioned it.
    #[serde(default)]
    pub provenance: BTreeSet<String>,
}

impl CandidatePlace {
    pub fn new(details: PlaceDetails, confidence: f32) -> Self {
        Self {
            details: details.sanitized(),
            confidence: clamp_confidence(confidence),
            provenance: BTreeSet::new(),
        }
    }

    pub fn with_provenance(mut self, sources: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.provenance.extend(sources.into_iter().map(Into::into));
        self
    }

    /// Number of distinct sources that corroborate this candidate.
    pub fn corroboration(&self) -> usize {
        self.provenance.len()
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    /// Convert a raw extractor record.
    ///
    /// Returns `None` for records with an empty name or an unknown place
    /// type. Unknown values for the other enumerations are dropped rather
    /// than rejecting the record.
    pub fn from_extracted(
        raw: ExtractedPlace,
        provenance: impl IntoIterator<Item = String>,
    ) -> Option<Self> {
        let name = raw.name.trim();
        if name.is_empty() {
            return None;
        }
        let place_type: PlaceType = raw.place_type.parse().ok()?;

        let mut details = PlaceDetails::new(name, place_type);
        details.zone = non_blank(raw.zone);
        details.address = non_blank(raw.address);
        details.coordinates = Coordinates::from_parts(raw.latitude, raw.longitude);
        details.suggested_stay = raw.suggested_stay.and_then(|s| s.parse().ok());
        details.physical_effort = raw.physical_effort;
        details.mental_effort = raw.mental_effort;
        details.best_days = raw.best_days.iter().filter_map(|d| d.parse().ok()).collect();
        details.best_times = raw.best_times.iter().filter_map(|t| t.parse().ok()).collect();
        details.periods_to_avoid = non_blank(raw.periods_to_avoid);
        details.tourist_trap = raw.tourist_trap;
        details.overrated = raw.overrated;
        details.local_secret = raw.local_secret;
        details.why_people_go = raw
            .why_people_go
            .into_iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        details.crowd_level = raw.crowd_level.and_then(|c| c.parse().ok());
        details.vibe_score = raw.vibe_score;
        details.price_range = raw.price_range.and_then(|p| p.parse().ok());
        details.setting = raw.setting.and_then(|s| s.parse().ok());
        details.cuisine_type = non_blank(raw.cuisine_type);
        details.local_description = non_blank(raw.local_description);
        details.warning = non_blank(raw.warning);

        Some(Self::new(details, raw.confidence).with_provenance(provenance))
    }

    /// Promote to a catalog place with a fresh id.
    pub fn into_place(self, city_id: CityId) -> Place {
        Place::new(city_id, self.details)
    }
}

fn clamp_confidence(c: f32) -> f32 {
    if c.is_finite() {
        c.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
