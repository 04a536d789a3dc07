//! Place records as returned by the reasoning service.
//!
//! These are deliberately loose: enumerated attributes arrive as free strings
//! and every optional attribute may be missing. The planner validates and
//! converts them into its closed model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One place the reasoning service believes exists in the corpus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedPlace {
    /// Display name as written in the source text.
    pub name: String,

    /// Place category (attraction, restaurant, bar, club, experience, view, zone).
    #[serde(rename = "type")]
    pub place_type: String,

    #[serde(default)]
    pub zone: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// quick, short, medium, long or half_day
    #[serde(default)]
    pub suggested_stay: Option<String>,

    /// 1 (easy) to 5 (demanding)
    #[serde(default)]
    pub physical_effort: Option<u8>,

    /// 1 (easy) to 5 (demanding)
    #[serde(default)]
    pub mental_effort: Option<u8>,

    #[serde(default)]
    pub best_days: Vec<String>,

    /// morning, afternoon, evening or night
    #[serde(default)]
    pub best_times: Vec<String>,

    #[serde(default)]
    pub periods_to_avoid: Option<String>,

    #[serde(default)]
    pub tourist_trap: bool,

    #[serde(default)]
    pub overrated: bool,

    #[serde(default)]
    pub local_secret: bool,

    #[serde(default)]
    pub why_people_go: Vec<String>,

    /// low, medium or high
    #[serde(default)]
    pub crowd_level: Option<String>,

    /// 0.0 touristy to 1.0 local
    #[serde(default)]
    pub vibe_score: Option<f32>,

    /// free, budget, moderate, expensive or luxury
    #[serde(default)]
    pub price_range: Option<String>,

    /// indoor, outdoor or mixed
    #[serde(default)]
    pub setting: Option<String>,

    #[serde(default)]
    pub cuisine_type: Option<String>,

    #[serde(default)]
    pub local_description: Option<String>,

    #[serde(default)]
    pub warning: Option<String>,

    /// How sure the service is that this place is real and in the city (0.0-1.0).
    pub confidence: f32,
}

impl ExtractedPlace {
    /// Create a record with a name, type and confidence; everything else empty.
    pub fn new(name: impl Into<String>, place_type: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            place_type: place_type.into(),
            confidence,
            ..Default::default()
        }
    }

    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.why_people_go = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Envelope the service fills when asked for candidate places.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CandidateEnvelope {
    pub places: Vec<ExtractedPlace>,
}
