//! layline-sim: sail a simulated boat to a waypoint under the layline planner.

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};

use layline_rs::angle::compass_point;
use layline_rs::config::{
    CONTROL_PERIOD_SECS, SIM_ARRIVAL_RADIUS_M, SIM_TIME_STEP_SECS, STATUS_UPDATE_INTERVAL_SECS,
};
use layline_rs::polar::laylines;
use layline_rs::simulator::{Environment, SimulatedBoat, Simulator};
use layline_rs::{Navigator, PlannerConfig, Position};

#[derive(Parser)]
#[command(name = "layline-sim")]
#[command(about = "Simulate a sailboat beating to a waypoint", long_about = None)]
struct Args {
    /// Start latitude in decimal degrees
    #[arg(long, default_value = "48.8566")]
    start_lat: f64,

    /// Start longitude in decimal degrees
    #[arg(long, default_value = "2.3522")]
    start_lon: f64,

    /// Initial boat heading in degrees
    #[arg(long, default_value = "0")]
    start_heading: f64,

    /// Waypoint latitude in decimal degrees
    #[arg(long, default_value = "48.8600")]
    wpt_lat: f64,

    /// Waypoint longitude in decimal degrees
    #[arg(long, default_value = "2.3530")]
    wpt_lon: f64,

    /// True wind speed in m/s
    #[arg(long, default_value = "5")]
    wind_speed: f64,

    /// Direction the true wind comes from, in degrees
    #[arg(long, default_value = "0")]
    wind_direction: f64,

    /// Disable the water current
    #[arg(long)]
    no_current: bool,

    /// Give up after this many simulated seconds
    #[arg(long, default_value = "1800")]
    duration: f64,

    /// Seed for the sensor noise
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Planner tuning as JSON (missing fields keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
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
    log::debug!("Planner configuration: {:?}", config);

    let start = Position::new(args.start_lat, args.start_lon);
    let waypoint = Position::new(args.wpt_lat, args.wpt_lon);

    let mut environment = Environment::new(args.wind_speed, args.wind_direction);
    if args.no_current {
        environment = environment.without_current();
    }

    let boat = SimulatedBoat::new(start, args.start_heading);
    let mut simulator = Simulator::new(boat, environment, args.seed)?;
    let mut navigator = Navigator::new(config);
    navigator.set_waypoint(waypoint);

    let layline = laylines(environment.wind_direction, environment.wind_speed);

    println!("Starting layline simulation...");
    println!("  Start:    {}", start);
    println!("  Waypoint: {}", waypoint);
    println!(
        "  Distance: {:.0}m, bearing {:.1}° ({})",
        start.distance_to(&waypoint),
        start.azimuth_to(&waypoint),
        compass_point(start.azimuth_to(&waypoint))
    );
    println!(
        "  Wind:     {:.1} m/s from {:.0}° ({})",
        environment.wind_speed,
        environment.wind_direction,
        compass_point(environment.wind_direction)
    );
    println!(
        "  Laylines: port {:.1}°, starboard {:.1}°\n",
        layline.port, layline.starboard
    );

    let steps_per_cycle = (CONTROL_PERIOD_SECS / SIM_TIME_STEP_SECS).round().max(1.0) as usize;
    let mut last_status_update = 0.0;
    let mut last_tack = None;
    let mut tacks = 0;

    while simulator.time() < args.duration {
        if navigator.has_arrived(&simulator.boat.position, SIM_ARRIVAL_RADIUS_M) {
            break;
        }

        if let Some(target) = navigator.cycle(&mut simulator)? {
            let tack = navigator.planner().current_tack();
            if tack != last_tack {
                if let (Some(from), Some(to)) = (last_tack, tack) {
                    tacks += 1;
                    println!(
                        "[{:>7.1}s] Tack {} -> {}, new heading {:.1}°",
                        simulator.time(),
                        from,
                        to,
                        target
                    );
                } else if let Some(to) = tack {
                    println!("[{:>7.1}s] Beating upwind on {}", simulator.time(), to);
                } else {
                    println!("[{:>7.1}s] Sailing direct", simulator.time());
                }
                last_tack = tack;
            }
        }

        for _ in 0..steps_per_cycle {
            simulator.step(SIM_TIME_STEP_SECS);
        }

        if simulator.time() - last_status_update >= STATUS_UPDATE_INTERVAL_SECS {
            last_status_update = simulator.time();
            let boat = &simulator.boat;
            println!("\n[Status Update] t = {:.1}s", simulator.time());
            println!("  Position: {}", boat.position);
            println!(
                "  Heading:  {:.1}° ({}), speed {:.2} m/s",
                boat.heading,
                compass_point(boat.heading),
                boat.speed
            );
            if let Some(target) = simulator.target_heading() {
                println!("  Target:   {:.1}° ({})", target, compass_point(target));
            }
            match navigator.planner().current_tack() {
                Some(tack) => println!("  Tack:     {}", tack),
                None => println!("  Tack:     direct"),
            }
            println!(
                "  Waypoint: {:.1}m to go\n",
                boat.position.distance_to(&waypoint)
            );
        }
    }

    let remaining = simulator.boat.position.distance_to(&waypoint);
    if remaining < SIM_ARRIVAL_RADIUS_M {
        println!(
            "\n✓ Arrived at waypoint after {:.1}s ({} tacks)",
            simulator.time(),
            tacks
        );
    } else {
        println!(
            "\n✗ Time limit reached after {:.1}s, {:.1}m from waypoint ({} tacks)",
            simulator.time(),
            remaining,
            tacks
        );
    }

    Ok(())
}
