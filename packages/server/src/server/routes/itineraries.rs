use axum::{extract::Extension, Json};
use planner::{CandidatePlace, GenerateOptions, ItineraryOutcome, TripPreferences};
use serde::Deserialize;

use crate::server::app::AppState;
use crate::server::error::ApiResult;

#[derive(Debug, Deserialize)]
pub struct ItineraryBody {
    #[serde(flatten)]
    pub preferences: TripPreferences,
    /// Ask the reasoning service for per-day focus zones first.
    #[serde(default)]
    pub use_skeleton: bool,
    /// Unpromoted discovery results to plan with alongside the catalog.
    #[serde(default)]
    pub candidates: Vec<CandidatePlace>,
}

pub async fn itinerary_handler(
    Extension(state): Extension<AppState>,
    Json(body): Json<ItineraryBody>,
) -> ApiResult<Json<ItineraryOutcome>> {
    let options = GenerateOptions::default()
        .with_candidates(body.candidates)
        .with_deadline(state.deadline());

    let outcome = if body.use_skeleton {
        state
            .planner
            .generate_with_skeleton(state.extractor.as_ref(), &body.preferences, options)
            .await?
    } else {
        state
            .planner
            .generate_itinerary(&body.preferences, options)
            .await?
    };

    Ok(Json(outcome))
}
