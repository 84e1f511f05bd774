//! Arm control module
//!
//! Drives the shoulder and elbow actuators of a two-link arm to Cartesian
//! targets, keeping demands continuous across the actuators' encoder wrap.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::dxl::{ActuatorHandle, TransportError};

// Internal
pub use params::*;
pub use state::*;
use crate::kinematics::OutOfReach;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ArmCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ArmCtrlError {
    #[error("Inverse kinematics failed: {0}")]
    OutOfReach(#[from] OutOfReach),

    #[error("Actuator transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid arm parameters: {0}")]
    InvalidParams(String),

    #[error("Expected actuator {0} to have been discovered but couldn't find it")]
    MissingActuator(u8),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Remove the handle for actuator `id` from a list of discovered handles.
pub fn take_handle(
    handles: &mut Vec<ActuatorHandle>,
    id: u8,
) -> Result<ActuatorHandle, ArmCtrlError> {
    match handles.iter().position(|h| h.id() == id) {
        Some(i) => Ok(handles.remove(i)),
        None => Err(ArmCtrlError::MissingActuator(id)),
    }
}
