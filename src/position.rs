use std::fmt;

use serde::{Deserialize, Serialize};

use crate::angle;

/// Earth's radius in meters.
const EARTH_RADIUS: f64 = 6371000.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}°, {:.6}°)", self.latitude, self.longitude)
    }
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Initial great-circle bearing from this position to another.
    /// Returns the azimuth in degrees (0-360, where 0 is North).
    pub fn azimuth_to(&self, other: &Position) -> f64 {
        let lat_from = self.latitude.to_radians();
        let lat_to = other.latitude.to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let y = delta_lon.sin() * lat_to.cos();
        let x = lat_from.cos() * lat_to.sin() - lat_from.sin() * lat_to.cos() * delta_lon.cos();

        angle::normalize(y.atan2(x).to_degrees())
    }

    /// Calculate distance to another position using Haversine formula.
    /// Read more here: https://en.wikipedia.org/wiki/Haversine_formula
    /// Returns the distance in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let lat_from = self.latitude.to_radians();
        let lat_to = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }

    /// Project a position forward by a given distance and heading
    /// heading: degrees (0-360, where 0 is North)
    /// distance: meters
    pub fn project(&self, heading: f64, distance: f64) -> Position {
        let lat1 = self.latitude.to_radians();
        let lon1 = self.longitude.to_radians();
        let brng = heading.to_radians();
        let angular_distance = distance / EARTH_RADIUS;

        let lat2 = (lat1.sin() * angular_distance.cos()
            + lat1.cos() * angular_distance.sin() * brng.cos())
        .asin();

        let lon2 = lon1
            + (brng.sin() * angular_distance.sin() * lat1.cos())
                .atan2(angular_distance.cos() - lat1.sin() * lat2.sin());

        // Normalize longitude to -180 to 180
        let lon2_normalized = (lon2.to_degrees() + 180.0).rem_euclid(360.0) - 180.0;

        Position::new(lat2.to_degrees(), lon2_normalized)
    }
}

/// Great-circle initial bearing from (lat1, lon1) to (lat2, lon2), degrees [0, 360).
pub fn azimuth(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Position::new(lat1, lon1).azimuth_to(&Position::new(lat2, lon2))
}

/// Haversine distance in meters between (lat1, lon1) and (lat2, lon2).
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Position::new(lat1, lon1).distance_to(&Position::new(lat2, lon2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_new_and_display() {
        let pos = Position::new(48.856600, 2.352200);

        assert_eq!(pos.latitude, 48.8566);
        assert_eq!(pos.longitude, 2.3522);

        let display = format!("{}", pos);
        assert_eq!(display, "(48.856600°, 2.352200°)");
    }

    #[test]
    fn test_azimuth_cardinal_directions() {
        let origin = Position::new(0.0, 0.0);
        assert!((origin.azimuth_to(&Position::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((origin.azimuth_to(&Position::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((origin.azimuth_to(&Position::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.azimuth_to(&Position::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_azimuth_short_hop() {
        let az = azimuth(48.8566, 2.3522, 48.8570, 2.3530);
        assert!((az - 52.76).abs() < 0.5, "azimuth was {}", az);
    }

    #[test]
    fn test_azimuth_stays_in_range_west_of_north() {
        // A bearing just west of north must wrap to ~359, never go negative.
        let az = azimuth(48.0, 2.0, 48.01, 1.9999);
        assert!((0.0..360.0).contains(&az));
        assert!(az > 350.0);
    }

    #[test]
    fn test_distance() {
        let d = distance(48.8566, 2.3522, 48.8570, 2.3530);
        assert!((d - 73.5).abs() < 0.5, "distance was {}", d);

        // One degree of latitude is ~111.2 km
        let d = distance(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111_195.0).abs() < 10.0);

        assert_eq!(distance(48.0, 2.0, 48.0, 2.0), 0.0);
    }

    #[test]
    fn test_project_round_trip() {
        let start = Position::new(48.8566, 2.3522);
        let end = start.project(80.0, 40.0);

        assert!((start.distance_to(&end) - 40.0).abs() < 0.01);
        assert!((start.azimuth_to(&end) - 80.0).abs() < 0.01);
    }
}
