//! Main arm executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise session and logging
//!     - Discover the actuators and bind the shoulder and elbow to the arm
//!     - Configure the actuators
//!     - Pursuit loop, until interrupted:
//!         - Synchronise and read the joint angles
//!         - Step towards the goal
//!         - Command the arm
//!     - Save the final arm state to the session

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::info;
use structopt::StructOpt;

// Internal
use arm_lib::{
    arm_ctrl::{self, take_handle, Arm},
    kinematics::WorldPoint,
    params::ArmExecParams,
    pursuit::{PursuitCtrl, PursuitLoop, StopToken},
    sim_bus::{self, SimBus},
};
use comms_if::eqpt::dxl::ActuatorBus;
use util::{
    host,
    logger::{logger_init, parse_level, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive a two-link arm after a goal point.
#[derive(Debug, StructOpt)]
#[structopt(name = "arm_exec")]
struct Opt {
    /// Goal x position, overrides the executable parameters.
    ///
    /// Units: meters, Frame: World
    #[structopt(long, allow_hyphen_values = true)]
    goal_x: Option<f64>,

    /// Goal y position, overrides the executable parameters.
    ///
    /// Units: meters, Frame: World
    #[structopt(long, allow_hyphen_values = true)]
    goal_y: Option<f64>,

    /// Minimum log level, one of info, debug or trace.
    #[structopt(long, default_value = "trace")]
    log_level: String,

    /// Stop after this many cycles instead of running until interrupted.
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Executable parameter file, relative to the params directory.
    #[structopt(long, default_value = "arm_exec.toml")]
    exec_params: String,

    /// Arm control parameter file, relative to the params directory.
    #[structopt(long, default_value = "arm_ctrl.toml")]
    arm_params: String,
}

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const PURSUIT_PARAMS: &str = "pursuit.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("arm_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(
        parse_level(&opt.log_level).wrap_err("Invalid log level")?,
        &session,
        &[(sim_bus::LOG_TARGET, LevelFilter::Debug)],
    )
    .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Arm Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: ArmExecParams =
        util::params::load(&opt.exec_params).wrap_err("Could not load exec params")?;
    let arm_params: arm_ctrl::Params =
        util::params::load(&opt.arm_params).wrap_err("Could not load arm params")?;

    info!("Exec parameters loaded");

    // ---- ACTUATOR DISCOVERY ----

    let mut bus = SimBus::from_params(&exec_params.sim);

    let mut handles = bus
        .scan(exec_params.first_actuator_id, exec_params.last_actuator_id)
        .wrap_err("Actuator scan failed")?;
    info!(
        "Found actuators {:?}",
        handles.iter().map(|h| h.id()).collect::<Vec<_>>()
    );

    let shoulder = take_handle(&mut handles, exec_params.shoulder_id)
        .wrap_err("Shoulder actuator not found")?;
    let elbow =
        take_handle(&mut handles, exec_params.elbow_id).wrap_err("Elbow actuator not found")?;

    // ---- MODULE INITIALISATION ----

    let mut arm = Arm::new(bus, shoulder, elbow, arm_params).wrap_err("Failed to create the arm")?;
    arm.configure_actuators(&exec_params.actuator_settings)
        .wrap_err("Failed to configure the actuators")?;
    info!("Arm initialised");

    let mut pursuit_ctrl = PursuitCtrl::default();
    pursuit_ctrl
        .init(PURSUIT_PARAMS, Some(&session))
        .wrap_err("Failed to initialise PursuitCtrl")?;
    info!("PursuitCtrl initialised");

    let goal = WorldPoint::new(
        opt.goal_x.unwrap_or(exec_params.goal_x_m),
        opt.goal_y.unwrap_or(exec_params.goal_y_m),
    );
    if !(goal.x().is_finite() && goal.y().is_finite()) {
        return Err(eyre!("Goal ({}, {}) is not a finite point", goal.x(), goal.y()));
    }
    info!("Goal: ({}, {})", goal.x(), goal.y());

    // ---- INTERRUPT HANDLING ----

    let stop = StopToken::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.stop())
        .wrap_err("Failed to set the interrupt handler")?;

    // ---- MAIN LOOP ----

    let mut pursuit = PursuitLoop::new(arm, pursuit_ctrl, goal);
    let result = pursuit.run(&stop, opt.max_cycles);

    // ---- SHUTDOWN ----

    let arm = pursuit.into_arm();
    session
        .save("arm_state.json", &arm.snapshot())
        .wrap_err("Failed to save the arm state")?;

    let num_cycles = result.wrap_err("Pursuit failed")?;

    info!("End of execution, {} cycles run", num_cycles);

    Ok(())
}
