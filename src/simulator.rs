//! Simplified sailboat physics for exercising the planner without a boat.
//!
//! The model is flat-earth and two-dimensional: a step polar gives the boat
//! speed for the true wind angle, the rudder turns the hull, and wind and
//! current push the boat sideways. Sensor readings carry seeded Gaussian
//! noise so runs are reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use crate::angle;
use crate::config::{
    SIM_GPS_NOISE_STDDEV_M, SIM_WATER_DIRECTION_DEG, SIM_WATER_SPEED,
    SIM_WIND_VANE_NOISE_STDDEV_DEG,
};
use crate::error::NavError;
use crate::position::Position;
use crate::sensors::{Clock, PositionSource, SteeringSink, WindReading, WindSource};
use crate::steering::HeadingController;

// ** PHYSICS CONSTANTS ** //

const RUDDER_IMPACT: f64 = 25.0;
const RUDDER_SPEED_COEFFICIENT: f64 = 0.028;
const RUDDER_BASE_EFFECTIVENESS: f64 = 0.393;
/// Rudder travel per second, in rudder units (full scale is [-1, 1])
const RUDDER_RATE: f64 = 20.0;
const RUDDER_SLOWING_FACTOR: f64 = 0.2;
const SPEED_INERTIA: f64 = 0.3; // accelerating
const SPEED_MOMENTUM: f64 = 0.7; // decelerating
const WIND_DRIFT_COEFFICIENT: f64 = 0.08;
const WATER_DRIFT_COEFFICIENT: f64 = 0.5;
const RIG_EFFICIENCY: f64 = 0.9;
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_000.0;
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Wind and current, both as "coming from" (wind) and "flowing to" (water) directions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Environment {
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub water_speed: f64,
    pub water_direction: f64,
}

impl Environment {
    pub fn new(wind_speed: f64, wind_direction: f64) -> Self {
        Self {
            wind_speed,
            wind_direction: angle::normalize(wind_direction),
            water_speed: SIM_WATER_SPEED,
            water_direction: SIM_WATER_DIRECTION_DEG,
        }
    }

    pub fn without_current(self) -> Self {
        Self {
            water_speed: 0.0,
            ..self
        }
    }
}

/// True state of the simulated hull.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulatedBoat {
    pub position: Position,
    pub heading: f64,
    /// Speed through the water, m/s
    pub speed: f64,
    /// Course over ground, None until the boat has moved
    pub course_over_ground: Option<f64>,
    rudder: f64,
    wanted_rudder: f64,
}

impl SimulatedBoat {
    pub fn new(position: Position, heading: f64) -> Self {
        Self {
            position,
            heading: angle::normalize(heading),
            speed: 0.0,
            course_over_ground: None,
            rudder: 0.0,
            wanted_rudder: 0.0,
        }
    }

    pub fn rudder(&self) -> f64 {
        self.rudder
    }

    /// Request a rudder position, clamped to [-1, 1]. The rudder moves there at a limited rate.
    pub fn set_rudder(&mut self, value: f64) {
        if !(-1.0..=1.0).contains(&value) {
            log::trace!("Rudder out of range: {:.2}", value);
        }
        self.wanted_rudder = value.clamp(-1.0, 1.0);
    }

    /// True wind angle off the bow in (-180, 180].
    pub fn true_wind_angle(&self, environment: &Environment) -> f64 {
        angle::signed_difference(environment.wind_direction, self.heading)
    }

    /// Advance the hull by `dt` seconds.
    pub fn update(&mut self, dt: f64, environment: &Environment) {
        let true_wind_angle = self.true_wind_angle(environment);

        self.rudder = rate_limited(dt, self.rudder, self.wanted_rudder, RUDDER_RATE);

        let base = boat_speed(environment.wind_speed, true_wind_angle);
        let inertialess = base - RUDDER_SLOWING_FACTOR * self.rudder.abs() * base;
        let scale = if inertialess > self.speed {
            SPEED_INERTIA
        } else {
            SPEED_MOMENTUM
        };
        let new_speed = inertialess * (1.0 - scale) + self.speed * scale;

        // The turn rate depends on the speed before this step
        let heading_change = RUDDER_IMPACT
            * (RUDDER_SPEED_COEFFICIENT * self.speed + RUDDER_BASE_EFFECTIVENESS * self.rudder)
            * dt;

        self.speed = new_speed;
        self.heading = angle::normalize(self.heading + heading_change);

        let (mut dx, mut dy) = displacement(self.heading, self.speed * dt);

        // Leeway: pushed downwind, harder above 7 m/s
        let wind_factor = if environment.wind_speed > 7.0 {
            7.0 + (environment.wind_speed - 7.0) * 1.5
        } else {
            environment.wind_speed
        };
        let (wx, wy) = displacement(
            environment.wind_direction + 180.0,
            WIND_DRIFT_COEFFICIENT * wind_factor * dt,
        );
        let (ox, oy) = displacement(
            environment.water_direction,
            WATER_DRIFT_COEFFICIENT * environment.water_speed * dt,
        );
        dx += wx + ox;
        dy += wy + oy;

        let meters_per_deg_lat = EARTH_CIRCUMFERENCE_M / 360.0;
        let meters_per_deg_lon = meters_per_deg_lat * self.position.latitude.to_radians().cos();
        self.position = Position::new(
            self.position.latitude + dy / meters_per_deg_lat,
            self.position.longitude + dx / meters_per_deg_lon,
        );

        if dx.abs() > 1e-9 || dy.abs() > 1e-9 {
            self.course_over_ground = Some(angle::normalize(dx.atan2(dy).to_degrees()));
        }
    }
}

/// Boat speed (m/s) for a true wind speed and angle, sails trimmed.
pub fn boat_speed(true_wind_speed: f64, true_wind_angle: f64) -> f64 {
    let abs_angle = true_wind_angle.abs();

    let speed_factor = if abs_angle < 45.0 {
        0.1
    } else if abs_angle < 90.0 {
        0.6 + (abs_angle - 45.0) / 75.0
    } else if abs_angle < 150.0 {
        0.8 + (abs_angle - 90.0) / 300.0
    } else {
        0.7 - (abs_angle - 150.0) / 600.0
    };

    let wind_factor = (true_wind_speed.clamp(0.0, 15.0) / 5.0).sqrt();

    4.0 * speed_factor * wind_factor * RIG_EFFICIENCY
}

/// Move `current` towards `wanted` by at most `rate * dt`.
fn rate_limited(dt: f64, current: f64, wanted: f64, rate: f64) -> f64 {
    let max_step = rate * dt;
    current + (wanted - current).clamp(-max_step, max_step)
}

/// East and north components of a move of `distance` meters along `heading`.
fn displacement(heading: f64, distance: f64) -> (f64, f64) {
    let rad = heading.to_radians();
    (distance * rad.sin(), distance * rad.cos())
}

/// Zero-mean Gaussian noise. The standard deviation must be finite and not negative.
fn noise_model(sensor: &str, stddev: f64) -> Result<Normal<f64>, NavError> {
    if !(stddev.is_finite() && stddev >= 0.0) {
        return Err(NavError::InvalidNoise(format!(
            "{} stddev must be finite and >= 0, got {}",
            sensor, stddev
        )));
    }

    Normal::new(0.0, stddev)
        .map_err(|e| NavError::InvalidNoise(format!("{} stddev {}: {}", sensor, stddev, e)))
}

/// Boat, environment and sensors wrapped behind the navigator's interfaces.
pub struct Simulator {
    pub environment: Environment,
    pub boat: SimulatedBoat,
    controller: HeadingController,
    target_heading: Option<f64>,
    time: f64,
    rng: StdRng,
    gps_noise: Normal<f64>,
    wind_vane_noise: Normal<f64>,
}

impl Simulator {
    /// Simulator with the default sensor noise.
    pub fn new(boat: SimulatedBoat, environment: Environment, seed: u64) -> Result<Self, NavError> {
        Self::with_noise(
            boat,
            environment,
            seed,
            SIM_GPS_NOISE_STDDEV_M,
            SIM_WIND_VANE_NOISE_STDDEV_DEG,
        )
    }

    pub fn with_noise(
        boat: SimulatedBoat,
        environment: Environment,
        seed: u64,
        gps_stddev_m: f64,
        wind_vane_stddev_deg: f64,
    ) -> Result<Self, NavError> {
        let gps_noise = noise_model("GPS", gps_stddev_m)?;
        let wind_vane_noise = noise_model("wind vane", wind_vane_stddev_deg)?;

        Ok(Self {
            environment,
            boat,
            controller: HeadingController::default(),
            target_heading: None,
            time: 0.0,
            rng: StdRng::seed_from_u64(seed),
            gps_noise,
            wind_vane_noise,
        })
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn target_heading(&self) -> Option<f64> {
        self.target_heading
    }

    /// Advance the world by `dt` seconds, steering towards the last target heading.
    pub fn step(&mut self, dt: f64) {
        if let Some(target) = self.target_heading {
            let rudder = self.controller.correction(target, self.boat.heading, dt);
            self.boat.set_rudder(rudder);
        }

        self.boat.update(dt, &self.environment);
        self.time += dt;
    }
}

impl PositionSource for Simulator {
    /// Position with GPS noise, independent on each axis.
    fn read_position(&mut self) -> Result<Position, NavError> {
        let true_position = self.boat.position;
        let north_error = self.gps_noise.sample(&mut self.rng);
        let east_error = self.gps_noise.sample(&mut self.rng);

        let lat = true_position.latitude + (north_error / EARTH_RADIUS_M).to_degrees();
        let lon = true_position.longitude
            + (east_error / (EARTH_RADIUS_M * true_position.latitude.to_radians().cos()))
                .to_degrees();

        Ok(Position::new(lat, lon))
    }

    /// The compass is taken as exact.
    fn read_compass_heading(&mut self) -> Result<f64, NavError> {
        Ok(self.boat.heading)
    }
}

impl WindSource for Simulator {
    fn read_wind(&mut self) -> Result<WindReading, NavError> {
        let noise = self.wind_vane_noise.sample(&mut self.rng);
        let relative = self.boat.true_wind_angle(&self.environment) + noise;

        Ok(WindReading {
            relative_direction: angle::signed_difference(relative, 0.0),
            speed: self.environment.wind_speed,
        })
    }
}

impl Clock for Simulator {
    fn now(&self) -> f64 {
        self.time
    }
}

impl SteeringSink for Simulator {
    fn set_target_heading(&mut self, heading: f64) -> Result<(), NavError> {
        if self.target_heading != Some(heading) {
            // error history belongs to the old target
            self.controller.reset();
        }
        self.target_heading = Some(heading);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CONTROL_PERIOD_SECS, SIM_TIME_STEP_SECS};
    use crate::navigator::Navigator;
    use crate::polar::{TackHeadings, find_vmg_optimal_tack_angle};
    use crate::wind::NoGoZone;

    fn start() -> Position {
        Position::new(48.8566, 2.3522)
    }

    fn quiet_simulator(heading: f64, environment: Environment) -> Simulator {
        Simulator::with_noise(SimulatedBoat::new(start(), heading), environment, 7, 0.0, 0.0)
            .unwrap()
    }

    /// Physics at 0.1s, navigator at 0.5s.
    fn run(simulator: &mut Simulator, navigator: &mut Navigator, duration: f64) -> Result<(), NavError> {
        let steps_per_cycle = (CONTROL_PERIOD_SECS / SIM_TIME_STEP_SECS).round() as usize;
        let cycles = (duration / CONTROL_PERIOD_SECS) as usize;
        for _ in 0..cycles {
            if let Some(heading) = navigator.cycle(simulator)? {
                assert!((0.0..360.0).contains(&heading));
            }
            for _ in 0..steps_per_cycle {
                simulator.step(SIM_TIME_STEP_SECS);
            }
        }
        Ok(())
    }

    #[test]
    fn test_boat_speed_polar() {
        assert!((boat_speed(5.0, 0.0) - 0.36).abs() < 1e-9);
        assert!((boat_speed(5.0, 60.0) - 2.88).abs() < 1e-9);
        assert!((boat_speed(5.0, -120.0) - 3.24).abs() < 1e-9);
        // Beam reach beats a dead run
        assert!(boat_speed(5.0, 90.0) > boat_speed(5.0, 180.0));
        // Diminishing returns above 15 m/s
        assert_eq!(boat_speed(15.0, 120.0), boat_speed(25.0, 120.0));
        assert_eq!(boat_speed(0.0, 90.0), 0.0);
    }

    #[test]
    fn test_rate_limited() {
        assert_eq!(rate_limited(0.1, 0.0, 1.0, 2.0), 0.2);
        assert_eq!(rate_limited(0.1, 0.0, -1.0, 2.0), -0.2);
        assert_eq!(rate_limited(0.5, 0.75, 1.0, 2.0), 1.0);
        assert_eq!(rate_limited(0.1, 0.5, 0.5, 2.0), 0.5);
    }

    #[test]
    fn test_boat_accelerates_on_a_reach() {
        let environment = Environment::new(5.0, 0.0).without_current();
        let mut boat = SimulatedBoat::new(start(), 90.0);

        for _ in 0..20 {
            boat.update(0.1, &environment);
        }

        assert!(boat.speed > 2.5 && boat.speed < 3.0);
        assert!(boat.position.longitude > start().longitude);
        // Wind from the north pushes the boat south
        assert!(boat.position.latitude < start().latitude);
        assert!(boat.course_over_ground.is_some());
    }

    #[test]
    fn test_rudder_turns_the_boat() {
        let environment = Environment::new(5.0, 0.0).without_current();
        let mut boat = SimulatedBoat::new(start(), 90.0);

        boat.set_rudder(3.0);
        boat.update(0.1, &environment);
        assert_eq!(boat.rudder(), 1.0);
        assert!(boat.heading > 90.0);

        boat.set_rudder(-1.0);
        let before = boat.heading;
        boat.update(0.1, &environment);
        assert!(boat.heading < before);
    }

    #[test]
    fn test_quiet_sensors_report_truth() -> Result<(), NavError> {
        let mut simulator = quiet_simulator(30.0, Environment::new(8.0, 270.0));

        assert_eq!(simulator.read_position()?, start());
        assert_eq!(simulator.read_compass_heading()?, 30.0);

        let wind = simulator.read_wind()?;
        assert!((wind.relative_direction - (-120.0)).abs() < 1e-9);
        assert_eq!(wind.speed, 8.0);
        Ok(())
    }

    #[test]
    fn test_noise_is_seeded() -> Result<(), NavError> {
        let environment = Environment::new(5.0, 0.0);
        let boat = SimulatedBoat::new(start(), 45.0);
        let mut first = Simulator::new(boat, environment, 42)?;
        let mut second = Simulator::new(boat, environment, 42)?;

        for _ in 0..10 {
            assert_eq!(first.read_position()?, second.read_position()?);
            assert_eq!(first.read_wind()?, second.read_wind()?);
        }

        let noisy = first.read_position()?;
        assert!(noisy.distance_to(&start()) < 10.0);
        Ok(())
    }

    #[test]
    fn test_invalid_noise_rejected() {
        let boat = SimulatedBoat::new(start(), 0.0);
        let environment = Environment::new(5.0, 0.0);

        let result = Simulator::with_noise(boat, environment, 1, -1.0, 5.0);
        assert!(matches!(result, Err(NavError::InvalidNoise(_))));

        let result = Simulator::with_noise(boat, environment, 1, 1.0, f64::NAN);
        assert!(matches!(result, Err(NavError::InvalidNoise(_))));

        let result = Simulator::with_noise(boat, environment, 1, f64::INFINITY, 5.0);
        assert!(matches!(result, Err(NavError::InvalidNoise(_))));

        assert!(Simulator::with_noise(boat, environment, 1, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_steering_holds_target() {
        let mut simulator = quiet_simulator(90.0, Environment::new(5.0, 0.0).without_current());
        simulator.set_target_heading(120.0).unwrap();

        for _ in 0..200 {
            simulator.step(0.1);
        }

        assert!((simulator.time() - 20.0).abs() < 1e-6);
        assert!(angle::signed_difference(120.0, simulator.boat.heading).abs() < 12.0);
    }

    #[test]
    fn test_navigator_closes_on_reachable_waypoint() -> Result<(), NavError> {
        let mut simulator = quiet_simulator(90.0, Environment::new(5.0, 0.0));
        let waypoint = start().project(90.0, 600.0);
        let mut navigator = Navigator::default();
        navigator.set_waypoint(waypoint);

        run(&mut simulator, &mut navigator, 120.0)?;

        assert_eq!(navigator.planner().current_tack(), None);
        assert!(simulator.boat.position.distance_to(&waypoint) < 400.0);
        Ok(())
    }

    #[test]
    fn test_navigator_beats_upwind() -> Result<(), NavError> {
        let mut simulator = quiet_simulator(0.0, Environment::new(5.0, 0.0));
        let waypoint = start().project(0.0, 400.0);
        let mut navigator = Navigator::default();
        navigator.set_waypoint(waypoint);

        let headings = TackHeadings::new(0.0, find_vmg_optimal_tack_angle(5.0));
        let steps_per_cycle = (CONTROL_PERIOD_SECS / SIM_TIME_STEP_SECS).round() as usize;

        for _ in 0..360 {
            navigator.cycle(&mut simulator)?;

            // Dead upwind: every decision is a close-hauled heading, never the waypoint bearing
            let raw = navigator.planner().last_raw_heading().unwrap();
            let on_port = angle::signed_difference(raw, headings.port).abs() < 1e-6;
            let on_starboard = angle::signed_difference(raw, headings.starboard).abs() < 1e-6;
            assert!(on_port || on_starboard, "raw heading {}", raw);
            assert!(navigator.planner().current_tack().is_some());

            assert!(!NoGoZone::for_wind(0.0, 5.0).contains(raw));
            assert!(simulator.target_heading().is_some());

            for _ in 0..steps_per_cycle {
                simulator.step(SIM_TIME_STEP_SECS);
            }
        }

        // Once settled the hull sails outside the no-go zone
        assert!(simulator.boat.true_wind_angle(&simulator.environment).abs() > 45.0);
        Ok(())
    }

    #[test]
    fn test_controller_resets_on_new_target() -> Result<(), NavError> {
        let mut simulator = quiet_simulator(90.0, Environment::new(5.0, 0.0));
        simulator.set_target_heading(100.0)?;
        simulator.step(0.1);
        let rudder = simulator.boat.rudder();
        assert!(rudder > 0.0);

        // Same target again keeps steering, a new one steers the other way
        simulator.set_target_heading(100.0)?;
        simulator.step(0.1);
        assert!(simulator.boat.rudder() > 0.0);

        simulator.set_target_heading(60.0)?;
        simulator.step(0.1);
        assert!(simulator.boat.rudder() < 0.0);
        assert_eq!(simulator.target_heading(), Some(60.0));
        Ok(())
    }
}
