use crate::angle;
use crate::config::{
    LIGHT_WIND_NO_GO_SCALE, LIGHT_WIND_SPEED, NO_GO_ZONE_ANGLE_DEG, STRONG_WIND_NO_GO_SCALE,
    STRONG_WIND_SPEED,
};

/// Absolute direction the wind comes from, given the compass heading and the
/// wind vane reading relative to the bow.
pub fn absolute_wind_direction(compass_heading: f64, wind_vane_relative: f64) -> f64 {
    angle::normalize(compass_heading + wind_vane_relative)
}

/// Half-angle of the no-go zone for a given wind speed.
/// Strong wind widens it, light wind lets the boat point higher.
pub fn no_go_half_angle(wind_speed: f64) -> f64 {
    if wind_speed > STRONG_WIND_SPEED {
        NO_GO_ZONE_ANGLE_DEG * STRONG_WIND_NO_GO_SCALE
    } else if wind_speed < LIGHT_WIND_SPEED {
        NO_GO_ZONE_ANGLE_DEG * LIGHT_WIND_NO_GO_SCALE
    } else {
        NO_GO_ZONE_ANGLE_DEG
    }
}

/// Returns `(min_angle, max_angle)` bounding the headings too close to the wind.
pub fn no_go_zone(wind_direction: f64, wind_speed: f64) -> (f64, f64) {
    NoGoZone::for_wind(wind_direction, wind_speed).bounds()
}

/// Membership test for a zone given by its bounds. When `min_angle > max_angle`
/// the zone spans North.
pub fn in_zone(azimuth: f64, min_angle: f64, max_angle: f64) -> bool {
    if min_angle > max_angle {
        azimuth >= min_angle || azimuth <= max_angle
    } else {
        azimuth >= min_angle && azimuth <= max_angle
    }
}

/// Sector of headings centered on the wind direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoGoZone {
    pub wind_direction: f64,
    pub half_angle: f64,
}

impl NoGoZone {
    pub fn for_wind(wind_direction: f64, wind_speed: f64) -> Self {
        Self {
            wind_direction: angle::normalize(wind_direction),
            half_angle: no_go_half_angle(wind_speed),
        }
    }

    /// Same zone with `buffer` degrees added on each side.
    pub fn widened(self, buffer: f64) -> Self {
        Self {
            half_angle: self.half_angle + buffer,
            ..self
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        (
            angle::normalize(self.wind_direction - self.half_angle),
            angle::normalize(self.wind_direction + self.half_angle),
        )
    }

    /// True if `heading` points into the zone (edges included).
    pub fn contains(&self, heading: f64) -> bool {
        angle::signed_difference(heading, self.wind_direction).abs() <= self.half_angle
    }
}
