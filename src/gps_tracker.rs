use chrono::Timelike;
use nmea::Nmea;

use crate::error::NavError;
use crate::position::Position;
use crate::sensors::PositionSource;

/// Latest GPS state, accumulated from NMEA sentences.
pub struct GpsTracker {
    nmea: Nmea,
    current_position: Option<Position>,
    current_heading: Option<f64>, // degrees, course over ground
    current_speed: Option<f64>,   // knots
    num_satellites: Option<u32>,
    fix_time: Option<f64>, // seconds since midnight UTC
}

impl Default for GpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl GpsTracker {
    pub fn new() -> Self {
        Self {
            nmea: Nmea::default(),
            current_position: None,
            current_heading: None,
            current_speed: None,
            num_satellites: None,
            fix_time: None,
        }
    }

    /// Parse one NMEA sentence and fold whatever it carries into the tracker.
    pub fn process_sentence(&mut self, sentence: &str) -> Result<(), NavError> {
        let trimmed = sentence.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        self.nmea
            .parse(trimmed)
            .map_err(|e| NavError::Nmea(format!("{}: {}", trimmed, e)))?;

        if let (Some(lat), Some(lon)) = (self.nmea.latitude, self.nmea.longitude) {
            self.update_position(lat, lon);
        }

        if let Some(course) = self.nmea.true_course {
            self.update_heading(course.into());
        }

        if let Some(speed) = self.nmea.speed_over_ground {
            self.update_speed(speed.into());
        }

        if let Some(num_sats) = self.nmea.num_of_fix_satellites {
            self.num_satellites = Some(num_sats);
        }

        if let Some(fix_time) = self.nmea.fix_time {
            self.fix_time = Some(
                fix_time.num_seconds_from_midnight() as f64
                    + fix_time.nanosecond() as f64 / 1_000_000_000.0,
            );
        }

        Ok(())
    }

    pub fn get_current_position(&self) -> Option<Position> {
        self.current_position
    }

    pub fn update_position(&mut self, lat: f64, lon: f64) {
        self.current_position = Some(Position::new(lat, lon));
    }

    pub fn get_current_heading(&self) -> Option<f64> {
        self.current_heading
    }

    pub fn update_heading(&mut self, heading: f64) {
        self.current_heading = Some(heading);
    }

    pub fn get_current_speed(&self) -> Option<f64> {
        self.current_speed
    }

    pub fn update_speed(&mut self, speed: f64) {
        self.current_speed = Some(speed);
    }

    pub fn get_num_satellites(&self) -> Option<u32> {
        self.num_satellites
    }

    pub fn get_fix_time(&self) -> Option<f64> {
        self.fix_time
    }
}

impl PositionSource for GpsTracker {
    fn read_position(&mut self) -> Result<Position, NavError> {
        self.current_position.ok_or(NavError::NoFix)
    }

    /// No compass fitted: course over ground stands in for the heading.
    fn read_compass_heading(&mut self) -> Result<f64, NavError> {
        self.current_heading.ok_or(NavError::NoHeading)
    }
}
