// This file is only compiled during tests

use crate::error::NavError;
use crate::position::Position;
use crate::sensors::{Clock, PositionSource, SteeringSink, WindReading, WindSource};

/// Scripted vessel: fixed sensor values, a clock that only moves when told to,
/// and a log of every heading it was asked to steer.
pub struct MockVessel {
    pub position: Option<Position>,
    pub compass_heading: f64,
    pub wind: WindReading,
    pub now: f64,
    pub steered: Vec<f64>,
}

impl MockVessel {
    pub fn new(position: Position, compass_heading: f64, wind_relative: f64, wind_speed: f64) -> Self {
        Self {
            position: Some(position),
            compass_heading,
            wind: WindReading {
                relative_direction: wind_relative,
                speed: wind_speed,
            },
            now: 0.0,
            steered: Vec::new(),
        }
    }

    pub fn without_fix() -> Self {
        Self {
            position: None,
            ..Self::new(Position::new(0.0, 0.0), 0.0, 0.0, 0.0)
        }
    }

    pub fn advance(&mut self, secs: f64) {
        self.now += secs;
    }
}

impl PositionSource for MockVessel {
    fn read_position(&mut self) -> Result<Position, NavError> {
        self.position.ok_or(NavError::NoFix)
    }

    fn read_compass_heading(&mut self) -> Result<f64, NavError> {
        Ok(self.compass_heading)
    }
}

impl WindSource for MockVessel {
    fn read_wind(&mut self) -> Result<WindReading, NavError> {
        Ok(self.wind)
    }
}

impl Clock for MockVessel {
    fn now(&self) -> f64 {
        self.now
    }
}

impl SteeringSink for MockVessel {
    fn set_target_heading(&mut self, heading: f64) -> Result<(), NavError> {
        self.steered.push(heading);
        Ok(())
    }
}
