//! # Manipulator PID Controller
//!
//! Demo binary: loads a controller configuration, builds the PID
//! controller against the simulated mass-damper robot, and runs a
//! paced periodic loop toward a step setpoint.

use std::path::PathBuf;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use manip_common::config::load_config;
use manip_common::event::TracingSink;
use manip_common::joints::JointVector;
use manip_pid::controller::PidController;
use manip_pid::sim::SimRobot;
use manip_pid::stats::CycleStats;
use manip_pid::store::ConfigStore;

/// Joint-space PID torque controller (simulated demo)
#[derive(Parser, Debug)]
#[command(name = "manip_pid")]
#[command(version)]
#[command(about = "Joint-space PID torque controller running against a simulated robot")]
struct Args {
    /// Path to the controller configuration TOML.
    #[arg(long, default_value = "config/controller.toml")]
    config: PathBuf,

    /// Step setpoint applied to every joint [rad or m].
    #[arg(long, default_value_t = 0.5)]
    setpoint: f64,

    /// Number of control cycles to run.
    #[arg(long, default_value_t = 5000)]
    cycles: u64,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    setup_tracing(&args);

    info!("manip_pid v{} starting...", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&args) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("manip_pid shutdown complete");
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&args.config)?;
    info!(
        "Config OK: {} joints, cycle_time={}µs",
        config.controller.number_of_joints, config.controller.cycle_time_us,
    );

    let cycle_time_us = config.controller.cycle_time_us;
    let store = ConfigStore::from_config(&config);
    let robot = SimRobot::new(store.joint_types());
    let mut controller = PidController::new(store, robot, TracingSink)?;

    controller.enable(true);
    controller.enable_tracking_error(true);
    let n = controller.store().joints();
    let setpoint = JointVector::filled(n, args.setpoint);
    controller.set_desired_position(&setpoint)?;

    let dt = cycle_time_us as f64 * 1e-6;
    let cycle_duration = Duration::from_micros(cycle_time_us as u64);
    let budget_ns = cycle_duration.as_nanos() as i64;
    let mut stats = CycleStats::new();

    for cycle in 0..args.cycles {
        let cycle_start = Instant::now();

        controller.tick(dt);
        controller.port_mut().step(dt);

        let elapsed = cycle_start.elapsed();
        stats.record(elapsed.as_nanos() as i64, budget_ns);

        if cycle % 1000 == 0 {
            info!(
                cycle,
                position = ?controller.measured_position().as_slice(),
                torque = ?controller.commanded_torque().as_slice(),
                "checkpoint"
            );
        }

        if let Some(remaining) = cycle_duration.checked_sub(elapsed) {
            std::thread::sleep(remaining);
        }
    }

    info!(
        cycles = stats.cycle_count,
        avg_ns = stats.avg_cycle_ns(),
        max_ns = stats.max_cycle_ns,
        overruns = stats.overruns,
        "run complete"
    );
    info!(
        final_position = ?controller.measured_position().as_slice(),
        "final state"
    );

    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
