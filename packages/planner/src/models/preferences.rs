//! Trip preferences supplied by the traveler.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::place::CityId;
use crate::error::{PlannerError, Result};

pub const MIN_RHYTHM: u8 = 1;
pub const MAX_RHYTHM: u8 = 5;

/// Upper bound on trip length accepted by [`TripPreferences::validate`].
pub const MAX_DAYS: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetTier {
    Budget,
    Moderate,
    Premium,
}

impl BudgetTier {
    /// Whether a price range sits above what this tier wants to spend.
    pub fn exceeded_by(&self, price: super::PriceRange) -> bool {
        use super::PriceRange::*;
        match self {
            Self::Budget => matches!(price, Moderate | Expensive | Luxury),
            Self::Moderate => matches!(price, Expensive | Luxury),
            Self::Premium => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub adults: u8,
    #[serde(default)]
    pub children: u8,
}

impl Party {
    pub fn has_children(&self) -> bool {
        self.children > 0
    }
}

/// Start and end of the planned part of each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl DayWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPreferences {
    pub city_id: CityId,
    pub start_date: NaiveDate,
    pub days: u32,
    /// 1 (slow) to 5 (packed)
    pub rhythm: u8,
    /// Interest id to priority. Matched against place tags and type names.
    #[serde(default)]
    pub interests: BTreeMap<String, f32>,
    #[serde(default)]
    pub party: Option<Party>,
    #[serde(default)]
    pub budget: Option<BudgetTier>,
    /// Preferred vibe score, 0.0 touristy to 1.0 local.
    #[serde(default)]
    pub locality: Option<f32>,
    #[serde(default)]
    pub day_window: Option<DayWindow>,
}

impl TripPreferences {
    pub fn new(city_id: CityId, start_date: NaiveDate, days: u32, rhythm: u8) -> Self {
        Self {
            city_id,
            start_date,
            days,
            rhythm,
            interests: BTreeMap::new(),
            party: None,
            budget: None,
            locality: None,
            day_window: None,
        }
    }

    pub fn with_interest(mut self, interest: impl Into<String>, weight: f32) -> Self {
        self.interests.insert(interest.into().to_lowercase(), weight);
        self
    }

    pub fn with_party(mut self, adults: u8, children: u8) -> Self {
        self.party = Some(Party { adults, children });
        self
    }

    pub fn with_budget(mut self, budget: BudgetTier) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_locality(mut self, locality: f32) -> Self {
        self.locality = Some(locality);
        self
    }

    pub fn with_day_window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.day_window = Some(DayWindow::new(start, end));
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.days == 0 {
            return Err(PlannerError::invalid("days must be at least 1"));
        }
        if self.days > MAX_DAYS {
            return Err(PlannerError::invalid(format!(
                "days must be at most {}",
                MAX_DAYS
            )));
        }
        if !(MIN_RHYTHM..=MAX_RHYTHM).contains(&self.rhythm) {
            return Err(PlannerError::invalid(format!(
                "rhythm must be between {} and {}, got {}",
                MIN_RHYTHM, MAX_RHYTHM, self.rhythm
            )));
        }
        if let Some(locality) = self.locality {
            if !(0.0..=1.0).contains(&locality) {
                return Err(PlannerError::invalid("locality must be within 0.0 and 1.0"));
            }
        }
        if self.interests.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(PlannerError::invalid("interest weights must be non-negative"));
        }
        if let Some(window) = self.day_window {
            if window.end <= window.start {
                return Err(PlannerError::invalid("day window must end after it starts"));
            }
        }
        if let Some(party) = self.party {
            if party.adults == 0 && party.children == 0 {
                return Err(PlannerError::invalid("party must include at least one traveler"));
            }
        }
        self.start_date
            .checked_add_days(Days::new(u64::from(self.days - 1)))
            .ok_or_else(|| PlannerError::invalid("date range overflows the calendar"))?;
        Ok(())
    }

    /// Calendar dates of the trip, in order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days).filter_map(move |offset| {
            self.start_date
                .checked_add_days(Days::new(u64::from(offset)))
        })
    }

    pub fn traveling_with_children(&self) -> bool {
        self.party.map(|p| p.has_children()).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prefs(days: u32, rhythm: u8) -> TripPreferences {
        TripPreferences::new(
            CityId::new(),
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            days,
            rhythm,
        )
    }

    #[test]
    fn test_validate_accepts_reasonable_trip() {
        assert!(prefs(3, 3).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(prefs(0, 3).validate(), Err(PlannerError::InputInvalid(_))));
        assert!(matches!(prefs(2, 0).validate(), Err(PlannerError::InputInvalid(_))));
        assert!(matches!(prefs(2, 6).validate(), Err(PlannerError::InputInvalid(_))));
        assert!(prefs(2, 3).with_locality(1.5).validate().is_err());
        assert!(prefs(2, 3).with_interest("food", -1.0).validate().is_err());
        assert!(prefs(2, 3).with_party(0, 0).validate().is_err());
    }

    #[test]
    fn test_dates_are_consecutive() {
        let dates: Vec<_> = prefs(3, 2).dates().collect();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2026, 5, 3).unwrap());
    }

    #[test]
    fn test_budget_tier_thresholds() {
        use crate::models::PriceRange;
        assert!(BudgetTier::Budget.exceeded_by(PriceRange::Moderate));
        assert!(!BudgetTier::Moderate.exceeded_by(PriceRange::Moderate));
        assert!(!BudgetTier::Premium.exceeded_by(PriceRange::Luxury));
    }
}
