use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::NavError;

// ** PLANNER CONFIGURATION ** //

/// Minimum time between two committed navigation decisions (seconds).
pub const DECISION_COOLDOWN_SECS: f64 = 4.0;
/// A tacking boat only bears away onto the direct course inside this radius (meters).
pub const WAYPOINT_ARRIVAL_DISTANCE_M: f64 = 15.0;
/// Distance a new upwind leg must cover before the first layline check (meters).
pub const MINIMUM_LEG_DISTANCE_M: f64 = 15.0;
/// Time a new upwind leg must last before the first layline check (seconds).
pub const MINIMUM_LEG_TIME_SECS: f64 = 7.0;
/// Consecutive cycles a layline crossing must hold before the tack is committed.
pub const TACK_CONFIRMATION_THRESHOLD: u32 = 5;
/// Beyond this distance the confirmation threshold is scaled up (meters).
pub const FAR_WAYPOINT_DISTANCE_M: f64 = 50.0;
pub const FAR_WAYPOINT_CONFIRMATION_MULTIPLIER: f64 = 1.5;
/// Extra angle past the layline before a tack is proposed (degrees).
pub const TACK_HYSTERESIS_MARGIN_DEG: f64 = 8.0;
/// Added to the no-go half-angle when judging if the waypoint can be fetched (degrees).
pub const NO_GO_ZONE_BUFFER_DEG: f64 = 7.0;
/// Below this distance the boat is considered on top of the waypoint (meters).
pub const COINCIDENT_DISTANCE_M: f64 = 0.01;

// ** WIND / POLAR CONFIGURATION ** //

/// Base half-angle of the no-go zone (degrees).
pub const NO_GO_ZONE_ANGLE_DEG: f64 = 45.0;
pub const STRONG_WIND_SPEED: f64 = 15.0; // m/s
pub const LIGHT_WIND_SPEED: f64 = 5.0; // m/s
pub const STRONG_WIND_NO_GO_SCALE: f64 = 1.2;
pub const LIGHT_WIND_NO_GO_SCALE: f64 = 0.8;
/// VMG search range for the upwind tack angle (degrees, inclusive).
pub const VMG_SEARCH_MIN_DEG: u32 = 35;
pub const VMG_SEARCH_MAX_DEG: u32 = 70;
pub const VMG_SEARCH_STEP_DEG: usize = 5;
pub const VMG_MINIMUM_TACK_ANGLE_DEG: f64 = 40.0;
pub const VMG_BASE_SAFETY_MARGIN_DEG: f64 = 5.0;
/// Above this wind speed the tack angle gets an extra drift margin.
pub const VMG_DRIFT_WIND_SPEED: f64 = 6.0;
pub const VMG_DRIFT_MARGIN_PER_MPS: f64 = 0.8;

// ** SMOOTHING CONFIGURATION ** //

pub const HEADING_HISTORY_SIZE: usize = 5;
pub const HEADING_SMOOTHING_FACTOR: f64 = 0.3;

// ** STEERING CONFIGURATION ** //

/// PID gains for the rudder heading-hold loop (rudder command per degree of error)
pub const STEERING_KP: f64 = 1.0 / 30.0;
pub const STEERING_KI: f64 = 0.0;
pub const STEERING_KD: f64 = 0.0;
/// Heading error below which no correction is applied (degrees)
pub const STEERING_DEADBAND_DEG: f64 = 2.0;
/// Rudder command range is [-STEERING_MAX_OUTPUT, STEERING_MAX_OUTPUT]
pub const STEERING_MAX_OUTPUT: f64 = 1.0;

// ** CONTROL LOOP CONFIGURATION ** //

/// Period between two planner invocations (seconds)
pub const CONTROL_PERIOD_SECS: f64 = 0.5;
pub const STATUS_UPDATE_INTERVAL_SECS: f64 = 10.0;

// ** SIMULATOR CONFIGURATION ** //

pub const SIM_TIME_STEP_SECS: f64 = 0.1;
pub const SIM_ARRIVAL_RADIUS_M: f64 = 5.0;
pub const SIM_GPS_NOISE_STDDEV_M: f64 = 1.0;
pub const SIM_WIND_VANE_NOISE_STDDEV_DEG: f64 = 5.0;
pub const SIM_WATER_SPEED: f64 = 0.25; // m/s
pub const SIM_WATER_DIRECTION_DEG: f64 = 225.0;

/// Planner tuning, loadable at runtime. Missing fields fall back to the constants above.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub decision_cooldown_secs: f64,
    pub arrival_distance_m: f64,
    pub minimum_leg_distance_m: f64,
    pub minimum_leg_time_secs: f64,
    pub tack_confirmation_threshold: u32,
    pub far_waypoint_distance_m: f64,
    pub far_waypoint_confirmation_multiplier: f64,
    pub tack_hysteresis_margin_deg: f64,
    pub no_go_zone_buffer_deg: f64,
    pub heading_history_size: usize,
    pub heading_smoothing_factor: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            decision_cooldown_secs: DECISION_COOLDOWN_SECS,
            arrival_distance_m: WAYPOINT_ARRIVAL_DISTANCE_M,
            minimum_leg_distance_m: MINIMUM_LEG_DISTANCE_M,
            minimum_leg_time_secs: MINIMUM_LEG_TIME_SECS,
            tack_confirmation_threshold: TACK_CONFIRMATION_THRESHOLD,
            far_waypoint_distance_m: FAR_WAYPOINT_DISTANCE_M,
            far_waypoint_confirmation_multiplier: FAR_WAYPOINT_CONFIRMATION_MULTIPLIER,
            tack_hysteresis_margin_deg: TACK_HYSTERESIS_MARGIN_DEG,
            no_go_zone_buffer_deg: NO_GO_ZONE_BUFFER_DEG,
            heading_history_size: HEADING_HISTORY_SIZE,
            heading_smoothing_factor: HEADING_SMOOTHING_FACTOR,
        }
    }
}

impl PlannerConfig {
    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, NavError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, NavError> {
        let config: PlannerConfig = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Confirmations needed before a proposed tack is committed.
    pub fn required_confirmations(&self, distance_to_waypoint: f64) -> u32 {
        if distance_to_waypoint > self.far_waypoint_distance_m {
            (self.tack_confirmation_threshold as f64 * self.far_waypoint_confirmation_multiplier)
                as u32
        } else {
            self.tack_confirmation_threshold
        }
    }
}
