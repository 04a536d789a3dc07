//! Places, cities and their closed attribute enumerations.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::common::{normalize_name, Coordinates, Id};

pub type PlaceId = Id<Place>;
pub type CityId = Id<City>;

/// Effort assumed when a record carries no rating.
pub const DEFAULT_EFFORT: u8 = 2;

// ============================================================================
// Enumerations
// ============================================================================

/// Implements `as_str`, `Display` and a case-insensitive `FromStr` over a
/// fixed list of spellings.
macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $name:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $ty {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $name),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let key = s.trim().to_lowercase().replace([' ', '-'], "_");
                match key.as_str() {
                    $($name $(| $alias)* => Ok(Self::$variant),)+
                    _ => Err(UnknownVariant {
                        kind: stringify!($ty),
                        value: s.to_string(),
                    }),
                }
            }
        }
    };
}

/// A string that did not name any variant of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceType {
    Attraction,
    Restaurant,
    Bar,
    Club,
    Experience,
    View,
    Zone,
}

string_enum!(PlaceType {
    Attraction => "attraction",
    Restaurant => "restaurant",
    Bar => "bar",
    Club => "club",
    Experience => "experience",
    View => "view",
    Zone => "zone",
});

impl PlaceType {
    /// Types that can fill a meal slot.
    pub fn is_food(&self) -> bool {
        matches!(self, Self::Restaurant | Self::Bar)
    }

    /// Types that only make sense after dark.
    pub fn is_nightlife(&self) -> bool {
        matches!(self, Self::Bar | Self::Club)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

string_enum!(Weekday {
    Monday => "monday" | "mon",
    Tuesday => "tuesday" | "tue" | "tues",
    Wednesday => "wednesday" | "wed",
    Thursday => "thursday" | "thu" | "thurs",
    Friday => "friday" | "fri",
    Saturday => "saturday" | "sat",
    Sunday => "sunday" | "sun",
});

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// Coarse time-of-day bucket used by best-times and upsell windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Night,
}

string_enum!(TimeOfDay {
    Morning => "morning",
    Afternoon => "afternoon",
    Evening => "evening",
    Night => "night" | "late_night",
});

impl TimeOfDay {
    /// Morning 05:00-12:00, afternoon 12:00-17:00, evening 17:00-21:00,
    /// night otherwise.
    pub fn of(time: NaiveTime) -> Self {
        match time.hour() {
            5..=11 => Self::Morning,
            12..=16 => Self::Afternoon,
            17..=20 => Self::Evening,
            _ => Self::Night,
        }
    }
}

/// How long people usually stay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StayBucket {
    Quick,
    Short,
    #[default]
    Medium,
    Long,
    HalfDay,
}

string_enum!(StayBucket {
    Quick => "quick",
    Short => "short",
    Medium => "medium",
    Long => "long",
    HalfDay => "half_day" | "halfday",
});

impl StayBucket {
    pub fn minutes(&self) -> u32 {
        match self {
            Self::Quick => 30,
            Self::Short => 60,
            Self::Medium => 90,
            Self::Long => 150,
            Self::HalfDay => 240,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrowdLevel {
    Low,
    Medium,
    High,
}

string_enum!(CrowdLevel {
    Low => "low",
    Medium => "medium" | "moderate",
    High => "high",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRange {
    Free,
    Budget,
    Moderate,
    Expensive,
    Luxury,
}

string_enum!(PriceRange {
    Free => "free",
    Budget => "budget" | "cheap" | "$",
    Moderate => "moderate" | "$$",
    Expensive => "expensive" | "$$$",
    Luxury => "luxury" | "$$$$",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Setting {
    Indoor,
    Outdoor,
    Mixed,
}

string_enum!(Setting {
    Indoor => "indoor",
    Outdoor => "outdoor",
    Mixed => "mixed" | "both",
});

// ============================================================================
// Place
// ============================================================================

/// Every attribute of a place except its identity.
///
/// Shared by catalog places and discovery candidates. Optional attributes
/// stay `None` when unknown so field-level merges can tell "unknown" from
/// "known and different".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    pub place_type: PlaceType,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub suggested_stay: Option<StayBucket>,
    #[serde(default)]
    pub physical_effort: Option<u8>,
    #[serde(default)]
    pub mental_effort: Option<u8>,
    #[serde(default)]
    pub best_days: BTreeSet<Weekday>,
    #[serde(default)]
    pub best_times: BTreeSet<TimeOfDay>,
    #[serde(default)]
    pub periods_to_avoid: Option<String>,
    #[serde(default)]
    pub tourist_trap: bool,
    #[serde(default)]
    pub overrated: bool,
    #[serde(default)]
    pub local_secret: bool,
    #[serde(default)]
    pub why_people_go: BTreeSet<String>,
    #[serde(default)]
    pub crowd_level: Option<CrowdLevel>,
    /// 0.0 touristy to 1.0 local
    #[serde(default)]
    pub vibe_score: Option<f32>,
    #[serde(default)]
    pub price_range: Option<PriceRange>,
    #[serde(default)]
    pub setting: Option<Setting>,
    /// Only meaningful for restaurants and bars.
    #[serde(default)]
    pub cuisine_type: Option<String>,
    #[serde(default)]
    pub local_description: Option<String>,
    #[serde(default)]
    pub warning: Option<String>,
    /// May appear more than once in one itinerary.
    #[serde(default)]
    pub revisit_friendly: bool,
}

impl PlaceDetails {
    pub fn new(name: impl Into<String>, place_type: PlaceType) -> Self {
        Self {
            name: name.into(),
            place_type,
            zone: None,
            address: None,
            coordinates: None,
            suggested_stay: None,
            physical_effort: None,
            mental_effort: None,
            best_days: BTreeSet::new(),
            best_times: BTreeSet::new(),
            periods_to_avoid: None,
            tourist_trap: false,
            overrated: false,
            local_secret: false,
            why_people_go: BTreeSet::new(),
            crowd_level: None,
            vibe_score: None,
            price_range: None,
            setting: None,
            cuisine_type: None,
            local_description: None,
            warning: None,
            revisit_friendly: false,
        }
    }

    /// Enforce model invariants: efforts in 1-5, vibe in 0-1, cuisine only
    /// on food places, trimmed name.
    pub fn sanitized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.physical_effort = self.physical_effort.map(|e| e.clamp(1, 5));
        self.mental_effort = self.mental_effort.map(|e| e.clamp(1, 5));
        self.vibe_score = self
            .vibe_score
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 1.0));
        if !self.place_type.is_food() {
            self.cuisine_type = None;
        }
        self
    }

    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }

    pub fn physical(&self) -> u8 {
        self.physical_effort.unwrap_or(DEFAULT_EFFORT)
    }

    pub fn mental(&self) -> u8 {
        self.mental_effort.unwrap_or(DEFAULT_EFFORT)
    }

    pub fn stay_minutes(&self) -> u32 {
        self.suggested_stay.unwrap_or_default().minutes()
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lng));
        self
    }

    pub fn with_stay(mut self, stay: StayBucket) -> Self {
        self.suggested_stay = Some(stay);
        self
    }

    pub fn with_effort(mut self, physical: u8, mental: u8) -> Self {
        self.physical_effort = Some(physical);
        self.mental_effort = Some(mental);
        self
    }

    pub fn with_best_days(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.best_days = days.into_iter().collect();
        self
    }

    pub fn with_best_times(mut self, times: impl IntoIterator<Item = TimeOfDay>) -> Self {
        self.best_times = times.into_iter().collect();
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.why_people_go = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_crowd(mut self, crowd: CrowdLevel) -> Self {
        self.crowd_level = Some(crowd);
        self
    }

    pub fn with_vibe(mut self, vibe: f32) -> Self {
        self.vibe_score = Some(vibe);
        self
    }

    pub fn with_price(mut self, price: PriceRange) -> Self {
        self.price_range = Some(price);
        self
    }

    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine_type = Some(cuisine.into());
        self
    }

    pub fn local_secret(mut self) -> Self {
        self.local_secret = true;
        self
    }

    pub fn tourist_trap(mut self) -> Self {
        self.tourist_trap = true;
        self
    }

    pub fn overrated(mut self) -> Self {
        self.overrated = true;
        self
    }

    pub fn revisit_friendly(mut self) -> Self {
        self.revisit_friendly = true;
        self
    }
}

/// A catalog place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: PlaceId,
    pub city_id: CityId,
    #[serde(flatten)]
    pub details: PlaceDetails,
}

impl Place {
    /// Create a place with a fresh id. Details are sanitized.
    pub fn new(city_id: CityId, details: PlaceDetails) -> Self {
        Self {
            id: PlaceId::new(),
            city_id,
            details: details.sanitized(),
        }
    }

    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn place_type(&self) -> PlaceType {
        self.details.place_type
    }

    /// A reference suitable for alternatives lists.
    pub fn to_ref(&self) -> PlaceRef {
        PlaceRef {
            id: self.id,
            name: self.details.name.clone(),
            place_type: self.details.place_type,
            zone: self.details.zone.clone(),
        }
    }
}

/// Lightweight pointer to a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceRef {
    pub id: PlaceId,
    pub name: String,
    pub place_type: PlaceType,
    #[serde(default)]
    pub zone: Option<String>,
}

// ============================================================================
// City
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    pub country: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl City {
    pub fn new(name: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            id: CityId::new(),
            name: name.into(),
            region: None,
            country: country.into(),
            coordinates: None,
            tags: BTreeSet::new(),
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_coordinates(mut self, lat: f64, lng: f64) -> Self {
        self.coordinates = Some(Coordinates::new(lat, lng));
        self
    }

    /// "Name, Region, Country" with empty parts skipped.
    pub fn display_name(&self) -> String {
        [Some(self.name.as_str()), self.region.as_deref(), Some(self.country.as_str())]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_type_parsing() {
        assert_eq!("Restaurant".parse::<PlaceType>(), Ok(PlaceType::Restaurant));
        assert_eq!(" view ".parse::<PlaceType>(), Ok(PlaceType::View));
        assert!("museum".parse::<PlaceType>().is_err());
    }

    #[test]
    fn test_weekday_aliases() {
        assert_eq!("Sat".parse::<Weekday>(), Ok(Weekday::Saturday));
        assert_eq!(Weekday::from(chrono::Weekday::Wed), Weekday::Wednesday);
    }

    #[test]
    fn test_time_of_day_buckets() {
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        assert_eq!(TimeOfDay::of(t(9)), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::of(t(12)), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::of(t(19)), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::of(t(22)), TimeOfDay::Night);
        assert_eq!(TimeOfDay::of(t(2)), TimeOfDay::Night);
    }

    #[test]
    fn test_sanitize_enforces_invariants() {
        let details = PlaceDetails::new("  Colosseo ", PlaceType::Attraction)
            .with_effort(9, 0)
            .with_vibe(3.0)
            .with_cuisine("roman")
            .sanitized();

        assert_eq!(details.name, "Colosseo");
        assert_eq!(details.physical_effort, Some(5));
        assert_eq!(details.mental_effort, Some(1));
        assert_eq!(details.vibe_score, Some(1.0));
        assert_eq!(details.cuisine_type, None);

        let trattoria = PlaceDetails::new("Da Enzo", PlaceType::Restaurant)
            .with_cuisine("roman")
            .sanitized();
        assert_eq!(trattoria.cuisine_type.as_deref(), Some("roman"));
    }

    #[test]
    fn test_place_serializes_flat() {
        let place = Place::new(CityId::new(), PlaceDetails::new("Pincio", PlaceType::View));
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["name"], "Pincio");
        assert_eq!(json["place_type"], "view");
        let back: Place = serde_json::from_value(json).unwrap();
        assert_eq!(back, place);
    }

    #[test]
    fn test_city_display_name_skips_empty_parts() {
        let city = City::new("Rome", "Italy").with_region("Lazio");
        assert_eq!(city.display_name(), "Rome, Lazio, Italy");
        assert_eq!(City::new("Lisbon", "Portugal").display_name(), "Lisbon, Portugal");
    }
}
