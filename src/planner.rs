//! Layline tacking path planner.
//!
//! Every control cycle the planner decides whether the waypoint can be reached
//! on a direct course or whether the boat has to beat upwind, which tack to
//! hold and when to go about. The decision is then smoothed so the rudder loop
//! does not chase every gust.

use std::fmt;

use crate::angle;
use crate::config::{COINCIDENT_DISTANCE_M, PlannerConfig};
use crate::polar::{TackHeadings, find_vmg_optimal_tack_angle};
use crate::position::Position;
use crate::smoothing::HeadingSmoother;
use crate::wind::{NoGoZone, absolute_wind_direction};

/// Which side the wind comes over while beating upwind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tack {
    Port,
    Starboard,
}

impl Tack {
    pub fn opposite(self) -> Tack {
        match self {
            Tack::Port => Tack::Starboard,
            Tack::Starboard => Tack::Port,
        }
    }
}

impl fmt::Display for Tack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tack::Port => write!(f, "PORT"),
            Tack::Starboard => write!(f, "STARBOARD"),
        }
    }
}

/// Where and when the current upwind leg began.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegStart {
    pub position: Position,
    pub timestamp: f64,
}

/// One cycle worth of telemetry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavInput {
    pub boat: Position,
    pub waypoint: Position,
    /// degrees, 0 = North
    pub compass_heading: f64,
    /// wind direction relative to the bow, degrees
    pub wind_vane_relative: f64,
    /// m/s
    pub wind_speed: f64,
    /// monotonic seconds
    pub now: f64,
}

/// Everything the planner remembers between cycles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannerState {
    /// None while sailing straight at the waypoint.
    pub current_tack: Option<Tack>,
    /// A tack change waiting for confirmation; always differs from `current_tack`.
    pub pending_tack: Option<Tack>,
    pub tack_confirmation_count: u32,
    pub last_decision_time: Option<f64>,
    pub last_raw_heading: Option<f64>,
    pub leg_start: Option<LegStart>,
    pub initial_tack_chosen_for_leg: bool,
    pub smoother: HeadingSmoother,
}

impl PlannerState {
    fn new(config: &PlannerConfig) -> Self {
        Self {
            smoother: HeadingSmoother::new(
                config.heading_history_size,
                config.heading_smoothing_factor,
            ),
            ..Self::default()
        }
    }

    pub fn last_smoothed_heading(&self) -> Option<f64> {
        self.smoother.last_smoothed()
    }

    /// Forget the current leg: no tack, nothing pending.
    fn reset_leg(&mut self) {
        self.leg_start = None;
        self.initial_tack_chosen_for_leg = false;
        self.current_tack = None;
        self.clear_pending();
    }

    fn clear_pending(&mut self) {
        self.pending_tack = None;
        self.tack_confirmation_count = 0;
    }
}

pub struct LaylinePathPlanner {
    config: PlannerConfig,
    state: PlannerState,
}

impl Default for LaylinePathPlanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LaylinePathPlanner {
    pub fn new() -> Self {
        Self::with_config(PlannerConfig::default())
    }

    pub fn with_config(config: PlannerConfig) -> Self {
        let state = PlannerState::new(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn current_tack(&self) -> Option<Tack> {
        self.state.current_tack
    }

    /// Decision of the last cycle before smoothing.
    pub fn last_raw_heading(&self) -> Option<f64> {
        self.state.last_raw_heading
    }

    /// Compute the heading to steer this cycle. Always finite, in [0, 360).
    pub fn calculate_direction(&mut self, input: &NavInput) -> f64 {
        let raw_heading = self.calculate_raw_direction(input);

        if raw_heading.is_finite() {
            self.state.last_raw_heading = Some(raw_heading);
        } else {
            log::warn!("Planner produced a non-finite heading from {:?}", input);
        }

        self.state.smoother.apply(raw_heading)
    }

    /// Clear all state, e.g. when a new waypoint is assigned.
    pub fn reset_planner_state(&mut self) {
        // keep the smoother's buffer, only its contents go
        let mut smoother = std::mem::take(&mut self.state.smoother);
        smoother.reset();
        self.state = PlannerState {
            smoother,
            ..PlannerState::default()
        };
        log::debug!("Planner state reset");
    }

    fn calculate_raw_direction(&mut self, input: &NavInput) -> f64 {
        let tack_angle = find_vmg_optimal_tack_angle(input.wind_speed);
        let azimuth_to_wpt = input.boat.azimuth_to(&input.waypoint);
        let distance_to_wpt = input.boat.distance_to(&input.waypoint);
        let wind_direction = absolute_wind_direction(input.compass_heading, input.wind_vane_relative);
        let headings = TackHeadings::new(wind_direction, tack_angle);

        if let (Some(decided_at), Some(raw)) =
            (self.state.last_decision_time, self.state.last_raw_heading)
        {
            if input.now - decided_at < self.config.decision_cooldown_secs {
                log::trace!("In decision cooldown, holding {:.1}°", raw);
                return raw;
            }
        }

        if distance_to_wpt < COINCIDENT_DISTANCE_M {
            return self.hold_course(&headings, input.compass_heading);
        }

        let no_go = NoGoZone::for_wind(wind_direction, input.wind_speed)
            .widened(self.config.no_go_zone_buffer_deg);
        let can_sail_direct = !no_go.contains(azimuth_to_wpt);

        match self.state.current_tack {
            Some(_) if can_sail_direct && distance_to_wpt < self.config.arrival_distance_m => {
                log::debug!(
                    "Waypoint fetchable at {:.1}m, bearing away onto direct course",
                    distance_to_wpt
                );
                return self.commit_direct(azimuth_to_wpt, input.now);
            }
            Some(_) => {}
            None if can_sail_direct => {
                log::debug!("Direct sailing to waypoint at {:.1}°", azimuth_to_wpt);
                return self.commit_direct(azimuth_to_wpt, input.now);
            }
            None => {
                if self.state.leg_start.is_none() {
                    self.state.leg_start = Some(LegStart {
                        position: input.boat,
                        timestamp: input.now,
                    });
                    log::debug!("Starting upwind leg at {}", input.boat);
                }
            }
        }

        let current = match self.state.current_tack {
            Some(tack) => tack,
            None => {
                let tack = self.choose_initial_tack(&headings, input.compass_heading, azimuth_to_wpt);
                self.state.current_tack = Some(tack);
                self.state.clear_pending();
                self.state.last_decision_time = Some(input.now);
                return headings.for_tack(tack);
            }
        };

        if let Some(leg) = self.state.leg_start {
            let traveled = input.boat.distance_to(&leg.position);
            let elapsed = input.now - leg.timestamp;
            if traveled < self.config.minimum_leg_distance_m
                || elapsed < self.config.minimum_leg_time_secs
            {
                log::trace!(
                    "Leg start protection: traveled {:.1}m, elapsed {:.1}s",
                    traveled,
                    elapsed
                );
                return headings.for_tack(current);
            }
        }

        let offset = angle::signed_difference(azimuth_to_wpt, wind_direction);
        let threshold = self.layline_threshold(tack_angle, input.wind_speed, distance_to_wpt);

        let proposal = match current {
            Tack::Port if offset > threshold => Some(current.opposite()),
            Tack::Starboard if offset < -threshold => Some(current.opposite()),
            _ => None,
        };

        let required = self.config.required_confirmations(distance_to_wpt);
        let tack = self.vote(current, proposal, required, input.now);

        headings.for_tack(tack)
    }

    /// Angle off the wind the waypoint must reach before going about.
    fn layline_threshold(&self, tack_angle: f64, wind_speed: f64, distance_to_wpt: f64) -> f64 {
        let wind_push_factor = if wind_speed > 5.0 {
            ((wind_speed - 5.0) * 2.5).min(20.0)
        } else {
            0.0
        };
        let distance_factor = (distance_to_wpt / 10.0).clamp(7.0, 15.0);

        tack_angle + self.config.tack_hysteresis_margin_deg + wind_push_factor.max(distance_factor)
    }

    /// Count consecutive proposals; commit once `required` is reached.
    /// Returns the tack to steer after this cycle.
    fn vote(&mut self, current: Tack, proposal: Option<Tack>, required: u32, now: f64) -> Tack {
        let Some(proposed) = proposal else {
            if self.state.pending_tack.take().is_some() {
                log::debug!("Tack conditions no longer met, resetting confirmation");
            }
            self.state.tack_confirmation_count = 0;
            return current;
        };

        if self.state.pending_tack == Some(proposed) {
            self.state.tack_confirmation_count += 1;
            log::debug!(
                "Tack proposal continues (conf {}/{})",
                self.state.tack_confirmation_count,
                required
            );
        } else {
            self.state.pending_tack = Some(proposed);
            self.state.tack_confirmation_count = 1;
            log::debug!("Tack to {} proposed (conf 1/{})", proposed, required);
        }

        if self.state.tack_confirmation_count < required {
            return current;
        }

        log::debug!("Tack confirmed: {} -> {}", current, proposed);
        self.state.current_tack = Some(proposed);
        self.state.clear_pending();
        self.state.last_decision_time = Some(now);
        proposed
    }

    fn choose_initial_tack(&mut self, headings: &TackHeadings, compass: f64, azimuth_to_wpt: f64) -> Tack {
        // First tack of the leg: least turning from where the bow points now.
        // Later re-entries: the tack that points closest to the waypoint.
        let reference = if self.state.initial_tack_chosen_for_leg {
            azimuth_to_wpt
        } else {
            compass
        };

        let port_diff = angle::signed_difference(headings.port, reference).abs();
        let starboard_diff = angle::signed_difference(headings.starboard, reference).abs();
        let tack = if port_diff < starboard_diff {
            Tack::Port
        } else {
            Tack::Starboard
        };

        if !self.state.initial_tack_chosen_for_leg {
            self.state.initial_tack_chosen_for_leg = true;
            log::debug!("Initial tack selected: {}", tack);
        } else {
            log::debug!("Resuming tacking on {}", tack);
        }
        tack
    }

    fn commit_direct(&mut self, azimuth_to_wpt: f64, now: f64) -> f64 {
        self.state.reset_leg();
        self.state.last_decision_time = Some(now);
        azimuth_to_wpt
    }

    /// Boat is sitting on the waypoint: there is no bearing to follow, keep doing what we were doing.
    fn hold_course(&self, headings: &TackHeadings, compass: f64) -> f64 {
        match (self.state.current_tack, self.state.last_raw_heading) {
            (Some(tack), _) => headings.for_tack(tack),
            (None, Some(raw)) => raw,
            (None, None) => angle::normalize(compass),
        }
    }
}
