//! replay: feed a recorded NMEA log through the planner and print its decisions.
//!
//! The log has no wind instrument, so the true wind is given on the command
//! line and course over ground stands in for the compass.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

use layline_rs::angle::{self, compass_point};
use layline_rs::sensors::{
    Clock, FixTimeClock, PositionSource, SteeringSink, WindReading, WindSource,
};
use layline_rs::{GpsTracker, NavError, Navigator, PlannerConfig, Position};

#[derive(Parser)]
#[command(name = "replay")]
#[command(about = "Replay an NMEA log through the layline planner", long_about = None)]
struct Args {
    /// NMEA 0183 log, one sentence per line
    log: PathBuf,

    /// Waypoint latitude in decimal degrees
    #[arg(long)]
    wpt_lat: f64,

    /// Waypoint longitude in decimal degrees
    #[arg(long)]
    wpt_lon: f64,

    /// True wind speed in m/s
    #[arg(long)]
    wind_speed: f64,

    /// Direction the true wind comes from, in degrees
    #[arg(long)]
    wind_direction: f64,

    /// Planner tuning as JSON (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
}

/// A recorded boat: positions from the log, wind from the command line.
struct ReplayVessel {
    tracker: GpsTracker,
    wind_direction: f64,
    wind_speed: f64,
    fix_clock: FixTimeClock,
    now: f64,
}

impl PositionSource for ReplayVessel {
    fn read_position(&mut self) -> Result<Position, NavError> {
        self.tracker.read_position()
    }

    fn read_compass_heading(&mut self) -> Result<f64, NavError> {
        self.tracker.read_compass_heading()
    }
}

impl WindSource for ReplayVessel {
    fn read_wind(&mut self) -> Result<WindReading, NavError> {
        let heading = self.tracker.read_compass_heading()?;
        Ok(WindReading {
            relative_direction: angle::signed_difference(self.wind_direction, heading),
            speed: self.wind_speed,
        })
    }
}

impl Clock for ReplayVessel {
    fn now(&self) -> f64 {
        self.now
    }
}

impl SteeringSink for ReplayVessel {
    fn set_target_heading(&mut self, _heading: f64) -> Result<(), NavError> {
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match &args.config {
        Some(path) => PlannerConfig::from_json_file(path)?,
        None => PlannerConfig::default(),
    };

    let waypoint = Position::new(args.wpt_lat, args.wpt_lon);
    let mut navigator = Navigator::new(config);
    navigator.set_waypoint(waypoint);

    let mut vessel = ReplayVessel {
        tracker: GpsTracker::new(),
        wind_direction: angle::normalize(args.wind_direction),
        wind_speed: args.wind_speed,
        fix_clock: FixTimeClock::new(),
        now: 0.0,
    };

    let reader = BufReader::new(File::open(&args.log)?);
    let mut last_cycle_time = None;
    let mut cycles = 0;
    let mut skipped = 0;

    println!("time_s,latitude,longitude,cog_deg,target_deg,target_point,tack,distance_m");

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if let Err(e) = vessel.tracker.process_sentence(&line) {
            log::warn!("line {}: {}", line_number + 1, e);
            skipped += 1;
            continue;
        }

        // Fix times carry on across midnight; without them every line counts as one second
        vessel.now = match vessel.tracker.get_fix_time() {
            Some(time_of_day) => vessel.fix_clock.update(time_of_day),
            None => (line_number + 1) as f64,
        };

        // GGA and RMC for the same second make a single cycle
        if last_cycle_time == Some(vessel.now) {
            continue;
        }

        let target = match navigator.cycle(&mut vessel) {
            Ok(Some(target)) => target,
            Ok(None) => continue,
            Err(NavError::NoFix) | Err(NavError::NoHeading) => {
                log::debug!("line {}: waiting for fix and course", line_number + 1);
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        last_cycle_time = Some(vessel.now);
        cycles += 1;

        let position = vessel.tracker.read_position()?;
        let cog = vessel.tracker.read_compass_heading()?;
        let tack = navigator
            .planner()
            .current_tack()
            .map_or_else(|| "DIRECT".to_string(), |tack| tack.to_string());

        println!(
            "{:.1},{:.6},{:.6},{:.1},{:.1},{},{},{:.1}",
            vessel.now,
            position.latitude,
            position.longitude,
            cog,
            target,
            compass_point(target),
            tack,
            position.distance_to(&waypoint)
        );
    }

    log::info!("{} planner cycles, {} sentences skipped", cycles, skipped);

    Ok(())
}
