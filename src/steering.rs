use crate::angle;
use crate::config::{
    STEERING_DEADBAND_DEG, STEERING_KD, STEERING_KI, STEERING_KP, STEERING_MAX_OUTPUT,
};

/// PID gains and limits for the heading-hold loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SteeringGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Heading error below which no correction is applied (degrees)
    pub deadband: f64,
    pub max_output: f64,
}

impl Default for SteeringGains {
    fn default() -> Self {
        Self {
            kp: STEERING_KP,
            ki: STEERING_KI,
            kd: STEERING_KD,
            deadband: STEERING_DEADBAND_DEG,
            max_output: STEERING_MAX_OUTPUT,
        }
    }
}

/// Turns a target heading into a rudder command.
/// Negative = turn left (port), positive = turn right (starboard).
pub struct HeadingController {
    gains: SteeringGains,
    integral: f64,
    last_error: f64,
}

impl Default for HeadingController {
    fn default() -> Self {
        Self::new(SteeringGains::default())
    }
}

impl HeadingController {
    pub fn new(gains: SteeringGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            last_error: 0.0,
        }
    }

    /// Calculate rudder correction using PID controller
    ///
    /// # Arguments
    /// * `target_heading` - Desired heading (degrees)
    /// * `current_heading` - Actual heading (degrees)
    /// * `dt` - Time delta since last update (seconds)
    ///
    /// # Returns
    /// Rudder command in [-max_output, max_output]
    pub fn correction(&mut self, target_heading: f64, current_heading: f64, dt: f64) -> f64 {
        let error = angle::signed_difference(target_heading, current_heading);

        if error.abs() < self.gains.deadband {
            return 0.0;
        }

        let p_term = self.gains.kp * error;

        self.integral += error * dt;
        let i_term = self.gains.ki * self.integral;

        let d_term = if dt > 0.0 {
            self.gains.kd * (error - self.last_error) / dt
        } else {
            0.0
        };

        self.last_error = error;

        (p_term + i_term + d_term).clamp(-self.gains.max_output, self.gains.max_output)
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }
}
