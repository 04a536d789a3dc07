//! Category-tagged search queries for a city.
//!
//! Templates carry a `{location}` placeholder that is replaced with the
//! fully qualified city ("Rome, Lazio, Italy") so same-named places in
//! other countries are less likely to show up.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    Attractions,
    Food,
    Bars,
    Nightlife,
    ViewsExperiences,
    Neighborhoods,
}

impl QueryCategory {
    pub const ALL: [QueryCategory; 6] = [
        Self::Attractions,
        Self::Food,
        Self::Bars,
        Self::Nightlife,
        Self::ViewsExperiences,
        Self::Neighborhoods,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Attractions => "attractions",
            Self::Food => "food",
            Self::Bars => "bars",
            Self::Nightlife => "nightlife",
            Self::ViewsExperiences => "views_experiences",
            Self::Neighborhoods => "neighborhoods",
        }
    }

    fn templates(&self) -> &'static [&'static str] {
        match self {
            Self::Attractions => &[
                "must-see attractions and landmarks in {location}",
                "hidden gem sights locals recommend in {location}",
                "underrated museums and historic sites in {location}",
            ],
            Self::Food => &[
                "best local restaurants where locals eat in {location}",
                "traditional food and trattorias not touristy {location}",
                "best cheap eats and street food {location}",
            ],
            Self::Bars => &[
                "best cocktail bars and wine bars in {location}",
                "local neighborhood bars and aperitivo spots {location}",
                "rooftop bars with a view {location}",
            ],
            Self::Nightlife => &[
                "nightlife clubs and live music venues in {location}",
                "where locals go out at night in {location}",
                "late night dancing and jazz clubs {location}",
            ],
            Self::ViewsExperiences => &[
                "best viewpoints and panoramic spots in {location}",
                "unique local experiences and tours in {location}",
                "sunset spots and scenic walks {location}",
            ],
            Self::Neighborhoods => &[
                "best neighborhoods to explore on foot in {location}",
                "authentic districts and quarters away from crowds {location}",
                "local markets and streets to wander {location}",
            ],
        }
    }
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchQuery {
    pub category: QueryCategory,
    pub text: String,
}

impl SearchQuery {
    pub fn new(category: QueryCategory, text: impl Into<String>) -> Self {
        Self {
            category,
            text: text.into(),
        }
    }
}

/// Build the ordered query set for a city.
///
/// Produces `variants_per_category` queries per category (capped at the
/// number of templates), in category order. Fails only on an empty city
/// name.
pub fn generate_queries(
    city: &str,
    region: Option<&str>,
    country: Option<&str>,
    variants_per_category: usize,
) -> Result<Vec<SearchQuery>> {
    let city = city.trim();
    if city.is_empty() {
        return Err(PlannerError::invalid("city name must not be empty"));
    }

    let location = [Some(city), region, country]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    let variants = variants_per_category.max(1);

    Ok(QueryCategory::ALL
        .iter()
        .flat_map(|category| {
            let location = &location;
            category
                .templates()
                .iter()
                .take(variants)
                .map(move |t| SearchQuery::new(*category, t.replace("{location}", location)))
        })
        .collect())
}
