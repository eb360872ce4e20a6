//! Interfaces to the hardware (or simulated) world around the planner.

use crate::error::NavError;
use crate::position::Position;

/// Wind as seen from the boat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindReading {
    /// Direction the wind comes from, relative to the bow (degrees).
    pub relative_direction: f64,
    /// m/s
    pub speed: f64,
}

/// GPS position and compass heading.
pub trait PositionSource {
    fn read_position(&mut self) -> Result<Position, NavError>;
    fn read_compass_heading(&mut self) -> Result<f64, NavError>;
}

pub trait WindSource {
    fn read_wind(&mut self) -> Result<WindReading, NavError>;
}

/// Monotonic time in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Whatever steers the boat: rudder loop, servo, autopilot.
pub trait SteeringSink {
    fn set_target_heading(&mut self, heading: f64) -> Result<(), NavError>;
}

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Clock driven by GPS fix times (seconds since midnight UTC).
///
/// A fix time more than half a day earlier than the last one is taken as a
/// midnight rollover and the clock carries on into the next day. Smaller steps
/// backwards (out of order sentences) are held at the last value, so the clock
/// never decreases.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FixTimeClock {
    day_offset: f64,
    last: Option<f64>,
}

impl FixTimeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to a new fix time of day and return the continuous time.
    pub fn update(&mut self, time_of_day: f64) -> f64 {
        let mut now = self.day_offset + time_of_day;

        if let Some(last) = self.last {
            if now < last - SECONDS_PER_DAY / 2.0 {
                self.day_offset += SECONDS_PER_DAY;
                now += SECONDS_PER_DAY;
                log::debug!("GPS time rolled over midnight");
            }
            now = now.max(last);
        }

        self.last = Some(now);
        now
    }
}

impl Clock for FixTimeClock {
    fn now(&self) -> f64 {
        self.last.unwrap_or(0.0)
    }
}
