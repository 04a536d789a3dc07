use axum::{extract::Extension, Json};
use planner::{promote, City, CityId, DiscoveryOutcome, DiscoveryRequest, PlannerError};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct DiscoverBody {
    /// Reuse a city already in the catalog. Otherwise a new one is created
    /// from `city`, `region` and `country`.
    #[serde(default)]
    pub city_id: Option<CityId>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    /// Write the ranked candidates into the catalog.
    #[serde(default)]
    pub promote: bool,
}

#[derive(Debug, Serialize)]
pub struct DiscoverResponse {
    pub city: City,
    #[serde(flatten)]
    pub outcome: DiscoveryOutcome,
    pub promoted: usize,
}

/// Discover candidate places for a city.
///
/// A degraded run still answers 200; `degraded` and `conditions` tell the
/// caller how much of the search went through.
pub async fn discover_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<DiscoverBody>,
) -> ApiResult<Json<DiscoverResponse>> {
    let city = resolve_city(&state, &body).await?;

    let mut request = DiscoveryRequest::new(city.id, city.name.clone());
    if let Some(region) = &city.region {
        request = request.with_region(region.clone());
    }
    if !city.country.trim().is_empty() {
        request = request.with_country(city.country.clone());
    }

    let cancel = state.shutdown.child_token();
    let outcome = state
        .discovery
        .discover(&request, &cancel, Some(state.deadline()))
        .await?;

    let promoted = if body.promote {
        promote(state.catalog.as_ref(), city.id, &outcome.candidates)
            .await?
            .len()
    } else {
        0
    };

    Ok(Json(DiscoverResponse {
        city,
        outcome,
        promoted,
    }))
}

async fn resolve_city(state: &AppState, body: &DiscoverBody) -> Result<City, PlannerError> {
    if let Some(city_id) = body.city_id {
        return state
            .catalog
            .city(city_id)
            .await?
            .ok_or(PlannerError::CityNotFound(city_id));
    }

    let name = body
        .city
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| PlannerError::invalid("either city_id or city is required"))?;

    let mut city = City::new(name, body.country.as_deref().unwrap_or_default().trim());
    if let Some(region) = body.region.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        city = city.with_region(region);
    }
    state.catalog.upsert_city(city).await
}
