//! Day-plan skeletons returned by the reasoning service.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A coarse outline for a multi-day trip: which part of the city to focus
/// on each day and a short theme. The planner fills in the actual slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DayPlanSkeleton {
    pub days: Vec<SkeletonDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkeletonDay {
    /// 1-based day number within the trip.
    pub day_number: u32,

    /// Neighborhood the day should gravitate around.
    #[serde(default)]
    pub focus_zone: Option<String>,

    /// Short theme, e.g. "Old town and markets".
    #[serde(default)]
    pub theme: Option<String>,
}

impl DayPlanSkeleton {
    /// Outline for a given day, if the service produced one.
    pub fn day(&self, day_number: u32) -> Option<&SkeletonDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }
}
