//! # Arm library.
//!
//! This library allows other crates in the workspace, and the integration
//! tests, to access items defined inside the arm crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm control module - holds the arm's geometry and actuators and moves the end effector
pub mod arm_ctrl;

/// Forward and inverse kinematics, angle normalisation and workspace bounding
pub mod kinematics;

/// Joint angle representation and minimal rotation demands
pub mod motion;

/// Executable parameters
pub mod params;

/// Pursuit control module - steps the arm towards a goal each cycle
pub mod pursuit;

/// Simulated actuator bus
pub mod sim_bus;
