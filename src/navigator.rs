use crate::config::PlannerConfig;
use crate::error::NavError;
use crate::planner::{LaylinePathPlanner, NavInput};
use crate::position::Position;
use crate::sensors::{Clock, PositionSource, SteeringSink, WindSource};

/// One control loop: reads the sensors, asks the planner for a heading and
/// hands it to the steering.
pub struct Navigator {
    planner: LaylinePathPlanner,
    waypoint: Option<Position>,
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl Navigator {
    pub fn new(config: PlannerConfig) -> Self {
        Self {
            planner: LaylinePathPlanner::with_config(config),
            waypoint: None,
        }
    }

    pub fn planner(&self) -> &LaylinePathPlanner {
        &self.planner
    }

    pub fn waypoint(&self) -> Option<Position> {
        self.waypoint
    }

    /// Assign the active waypoint. A different waypoint starts a fresh session.
    pub fn set_waypoint(&mut self, waypoint: Position) {
        if self.waypoint != Some(waypoint) {
            log::info!("New waypoint {}", waypoint);
            self.planner.reset_planner_state();
            self.waypoint = Some(waypoint);
        }
    }

    pub fn clear_waypoint(&mut self) {
        self.waypoint = None;
        self.planner.reset_planner_state();
    }

    /// Run one cycle. Returns the heading sent to the steering, or None when no
    /// waypoint is set.
    pub fn cycle<V>(&mut self, vessel: &mut V) -> Result<Option<f64>, NavError>
    where
        V: PositionSource + WindSource + Clock + SteeringSink,
    {
        let Some(waypoint) = self.waypoint else {
            return Ok(None);
        };

        let boat = vessel.read_position()?;
        let compass_heading = vessel.read_compass_heading()?;
        let wind = vessel.read_wind()?;

        let input = NavInput {
            boat,
            waypoint,
            compass_heading,
            wind_vane_relative: wind.relative_direction,
            wind_speed: wind.speed,
            now: vessel.now(),
        };

        let heading = self.planner.calculate_direction(&input);
        vessel.set_target_heading(heading)?;

        Ok(Some(heading))
    }

    /// True once `position` is within `radius` meters of the waypoint.
    pub fn has_arrived(&self, position: &Position, radius: f64) -> bool {
        self.waypoint
            .is_some_and(|waypoint| position.distance_to(&waypoint) < radius)
    }
}
