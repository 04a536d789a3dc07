//! Optional day-plan outline from the reasoning service.

use extraction::{DayPlanSkeleton, ExtractionError, Extractor};
use tracing::{info, warn};

use crate::error::{Condition, PlannerError, Result};
use crate::models::{City, Place, TripPreferences};

/// Ask the extractor for a per-day focus zone and theme.
///
/// Any failure other than quota exhaustion degrades to "no skeleton" and a
/// [`Condition::SkeletonUnavailable`]; the scheduler then infers zones
/// from the places it picks.
pub async fn fetch_skeleton<E>(
    extractor: &E,
    city: &City,
    prefs: &TripPreferences,
    places: &[Place],
) -> Result<(Option<DayPlanSkeleton>, Option<Condition>)>
where
    E: Extractor + ?Sized,
{
    let prompt = skeleton_prompt(city, prefs, places);

    match extractor.plan_skeleton(&prompt).await {
        Ok(skeleton) => {
            info!(days = skeleton.days.len(), "Day-plan skeleton received");
            Ok((Some(skeleton), None))
        }
        Err(ExtractionError::QuotaExhausted) => Err(PlannerError::UpstreamQuotaExhausted),
        Err(e) => {
            warn!(error = %e, "Skeleton unavailable, inferring zones");
            Ok((
                None,
                Some(Condition::SkeletonUnavailable {
                    reason: e.to_string(),
                }),
            ))
        }
    }
}

fn skeleton_prompt(city: &City, prefs: &TripPreferences, places: &[Place]) -> String {
    let mut zones: Vec<&str> = places.iter().filter_map(|p| p.details.zone.as_deref()).collect();
    zones.sort_unstable();
    zones.dedup();

    let interests = if prefs.interests.is_empty() {
        "none given".to_string()
    } else {
        prefs.interests.keys().cloned().collect::<Vec<_>>().join(", ")
    };

    format!(
        "Outline a {days}-day trip to {city} starting {start}. Pace: {rhythm} of 5. \
         Interests: {interests}. For each day give day_number, a focus_zone chosen \
         from these neighborhoods: {zones}, and a short theme.",
        days = prefs.days,
        city = city.display_name(),
        start = prefs.start_date,
        rhythm = prefs.rhythm,
        interests = interests,
        zones = if zones.is_empty() { "any".to_string() } else { zones.join(", ") },
    )
}
