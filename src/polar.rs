use crate::angle;
use crate::config::{
    VMG_BASE_SAFETY_MARGIN_DEG, VMG_DRIFT_MARGIN_PER_MPS, VMG_DRIFT_WIND_SPEED,
    VMG_MINIMUM_TACK_ANGLE_DEG, VMG_SEARCH_MAX_DEG, VMG_SEARCH_MIN_DEG, VMG_SEARCH_STEP_DEG,
};
use crate::planner::Tack;

/// Boat speed (m/s) from a simplified step polar.
/// `wind_angle` is the angle between bow and wind, any sign or range.
pub fn polar_boat_speed(wind_angle: f64, wind_speed: f64) -> f64 {
    let folded = wind_angle.abs() % 360.0;
    let abs_wind_angle = if folded > 180.0 { 360.0 - folded } else { folded };

    match abs_wind_angle {
        a if a < 35.0 => 0.0,              // can't sail this close to the wind
        a if a < 50.0 => 0.2 * wind_speed, // close-hauled
        a if a < 90.0 => 0.4 * wind_speed, // reaching
        a if a < 150.0 => 0.6 * wind_speed, // broad reach, fastest
        _ => 0.35 * wind_speed,            // running
    }
}

/// Angle off the true wind that maximizes upwind VMG, plus a safety margin
/// that grows with wind speed to absorb leeway.
pub fn find_vmg_optimal_tack_angle(wind_speed: f64) -> f64 {
    let mut best_vmg = f64::NEG_INFINITY;
    let mut optimal_angle = 50.0;

    for angle_deg in (VMG_SEARCH_MIN_DEG..=VMG_SEARCH_MAX_DEG).step_by(VMG_SEARCH_STEP_DEG) {
        let angle_deg = angle_deg as f64;
        let vmg = polar_boat_speed(angle_deg, wind_speed) * angle_deg.to_radians().cos();
        if vmg > best_vmg {
            best_vmg = vmg;
            optimal_angle = angle_deg;
        }
    }

    let drift_margin = if wind_speed > VMG_DRIFT_WIND_SPEED {
        (wind_speed - VMG_DRIFT_WIND_SPEED) * VMG_DRIFT_MARGIN_PER_MPS
    } else {
        0.0
    };

    optimal_angle.max(VMG_MINIMUM_TACK_ANGLE_DEG) + VMG_BASE_SAFETY_MARGIN_DEG + drift_margin
}

/// Close-hauled headings on each tack for a given wind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TackHeadings {
    pub port: f64,
    pub starboard: f64,
}

impl TackHeadings {
    pub fn new(wind_direction: f64, tack_angle: f64) -> Self {
        Self {
            port: angle::normalize(wind_direction - tack_angle),
            starboard: angle::normalize(wind_direction + tack_angle),
        }
    }

    pub fn for_tack(&self, tack: Tack) -> f64 {
        match tack {
            Tack::Port => self.port,
            Tack::Starboard => self.starboard,
        }
    }
}

/// Bearings of the two laylines as seen from the waypoint, pointing downwind
/// towards where a boat would approach from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Laylines {
    pub port: f64,
    pub starboard: f64,
}

pub fn laylines(wind_direction: f64, wind_speed: f64) -> Laylines {
    let headings = TackHeadings::new(wind_direction, find_vmg_optimal_tack_angle(wind_speed));
    Laylines {
        port: angle::normalize(headings.port + 180.0),
        starboard: angle::normalize(headings.starboard + 180.0),
    }
}
