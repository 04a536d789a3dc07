//! Coordinates and walking-distance heuristics.

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from optional parts; both must be present and in range.
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        let (lat, lng) = (lat?, lng?);
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        valid.then_some(Self { lat, lng })
    }

    /// Great-circle (haversine) distance in meters.
    pub fn distance_m(&self, other: &Coordinates) -> f64 {
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

/// Straight-line walking estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkingModel {
    /// Walking speed in km/h.
    pub speed_kmh: f64,
    /// Multiplier from straight-line to street distance.
    pub detour_factor: f64,
    /// Used when either end has no coordinates.
    pub default_minutes: u32,
}

impl Default for WalkingModel {
    fn default() -> Self {
        Self {
            speed_kmh: 4.5,
            detour_factor: 1.3,
            default_minutes: 15,
        }
    }
}

impl WalkingModel {
    /// Minutes to walk between two points, rounded up.
    pub fn minutes_between(&self, from: Option<Coordinates>, to: Option<Coordinates>) -> u32 {
        match (from, to) {
            (Some(a), Some(b)) => {
                let km = a.distance_m(&b) / 1000.0 * self.detour_factor;
                let speed = self.speed_kmh.max(0.1);
                (km / speed * 60.0).ceil() as u32
            }
            _ => self.default_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_known_pair() {
        // Colosseum to Pantheon is roughly 1.6 km
        let colosseum = Coordinates::new(41.8902, 12.4922);
        let pantheon = Coordinates::new(41.8986, 12.4769);
        let d = colosseum.distance_m(&pantheon);
        assert!((1300.0..2000.0).contains(&d), "got {}", d);
    }

    #[test]
    fn test_five_meters_apart() {
        let a = Coordinates::new(41.89570, 12.47160);
        let b = Coordinates::new(41.89574, 12.47162);
        assert!(a.distance_m(&b) < 10.0);
    }

    #[test]
    fn test_walking_minutes() {
        let walk = WalkingModel::default();
        let a = Coordinates::new(41.8902, 12.4922);
        let b = Coordinates::new(41.8986, 12.4769);
        let minutes = walk.minutes_between(Some(a), Some(b));
        assert!((25..45).contains(&minutes), "got {}", minutes);
        assert_eq!(walk.minutes_between(None, Some(b)), 15);
        assert_eq!(walk.minutes_between(Some(a), Some(a)), 0);
    }

    #[test]
    fn test_from_parts_rejects_out_of_range() {
        assert!(Coordinates::from_parts(Some(91.0), Some(0.0)).is_none());
        assert!(Coordinates::from_parts(Some(10.0), None).is_none());
        assert!(Coordinates::from_parts(Some(10.0), Some(20.0)).is_some());
    }
}
