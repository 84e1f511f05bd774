//! # Position Actuator Bus Interface
//!
//! Defines how the arm software talks to a network of daisy chained position actuators. The
//! network performs a batched read/write of every actuator on [`ActuatorBus::synchronize`], after
//! which each actuator's register cache is considered fresh.
//!
//! Actuators are identified by an [`ActuatorHandle`]. Handles can't be cloned and are only created
//! by discovery ([`ActuatorBus::scan`]), so whoever holds a handle is the only thing that can
//! command that actuator.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of position ticks in one full turn of an actuator's output shaft.
pub const TICKS_PER_TURN: i32 = 4096;

/// Largest value accepted by the torque limit registers.
pub const MAX_TORQUE_LIMIT: u16 = 1024;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A network of position actuators.
///
/// Register reads return the cached value from the last [`synchronize`](Self::synchronize) and
/// [`read_all`](Self::read_all). Actuators in synchronised mode hold writes until the next
/// synchronisation.
pub trait ActuatorBus {
    /// Scan the network for actuators with ids in `first_id..=last_id`, returning an owned handle
    /// for each actuator found, in id order.
    fn scan(&mut self, first_id: u8, last_id: u8) -> Result<Vec<ActuatorHandle>, TransportError>;

    /// Apply speed, torque and synchronisation settings to an actuator.
    fn configure(
        &mut self,
        actuator: &ActuatorHandle,
        settings: &ActuatorSettings,
    ) -> Result<(), TransportError>;

    /// Perform a batched read/write across every actuator on the network.
    fn synchronize(&mut self) -> Result<(), TransportError>;

    /// Refresh the register cache of a single actuator from the last synchronisation.
    fn read_all(&mut self, actuator: &ActuatorHandle) -> Result<(), TransportError>;

    /// Read a cached register value.
    fn cached(&self, actuator: &ActuatorHandle, register: Register) -> Result<i32, TransportError>;

    /// Write the goal position register.
    ///
    /// Goals are not limited to `[0, TICKS_PER_TURN)`. A goal below zero or
    /// past a full turn asks for a move of `goal_ticks - current_position`
    /// ticks, continuing through the encoder zero rather than wrapping back
    /// the long way. Implementations must either pass such goals to the
    /// actuator's multi-turn mode or translate them into that relative move.
    ///
    /// Units: ticks
    fn set_goal_position(
        &mut self,
        actuator: &ActuatorHandle,
        goal_ticks: i32,
    ) -> Result<(), TransportError>;

    /// Cached current position of the actuator.
    ///
    /// Units: ticks, in `[0, TICKS_PER_TURN)`
    fn current_position(&self, actuator: &ActuatorHandle) -> Result<i32, TransportError> {
        self.cached(actuator, Register::CurrentPosition)
    }

    /// Cached "in motion" flag of the actuator.
    fn is_moving(&self, actuator: &ActuatorHandle) -> Result<bool, TransportError> {
        Ok(self.cached(actuator, Register::Moving)? != 0)
    }
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Owned reference to a single actuator on the bus.
#[derive(Debug, Hash, Eq, PartialEq)]
pub struct ActuatorHandle {
    id: u8,
}

/// Settings applied to every actuator before control starts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActuatorSettings {
    /// Speed at which the actuator moves towards its goal.
    ///
    /// Units: ticks per synchronisation for simulated actuators, native speed units otherwise
    pub moving_speed: u16,

    /// Enable holding torque.
    pub torque_enable: bool,

    /// Enable torque control mode. Must be off for position control.
    pub torque_control_enable: bool,

    /// Running torque limit, at most [`MAX_TORQUE_LIMIT`].
    pub torque_limit: u16,

    /// Torque limit applied at power on, at most [`MAX_TORQUE_LIMIT`].
    pub max_torque: u16,

    /// Only apply goal writes on network synchronisation.
    pub synchronized: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Registers of an actuator that the arm software reads.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum Register {
    CurrentPosition,
    GoalPosition,
    Moving,
    MovingSpeed,
    TorqueEnable,
    TorqueLimit,
}

/// Errors raised by an actuator bus.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("No actuators found with ids {0} to {1}")]
    NoneFound(u8, u8),

    #[error("Actuator {0} did not respond")]
    Timeout(u8),

    #[error("Actuator {0} is not on the bus")]
    UnknownActuator(u8),

    #[error("Invalid actuator settings: {0}")]
    InvalidSettings(String),

    #[error("Bus IO error: {0}")]
    Io(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActuatorHandle {
    /// Bind a handle to an actuator id.
    ///
    /// Only bus implementations should call this, from within [`ActuatorBus::scan`].
    pub fn bind(id: u8) -> Self {
        Self { id }
    }

    /// Bus id of the actuator.
    pub fn id(&self) -> u8 {
        self.id
    }
}

impl ActuatorSettings {
    /// Check the settings are within the ranges the actuators accept.
    pub fn validate(&self) -> Result<(), TransportError> {
        if self.torque_limit > MAX_TORQUE_LIMIT || self.max_torque > MAX_TORQUE_LIMIT {
            return Err(TransportError::InvalidSettings(format!(
                "torque limits must be at most {}",
                MAX_TORQUE_LIMIT
            )));
        }
        if self.torque_control_enable {
            return Err(TransportError::InvalidSettings(
                "torque control mode can't be used for position control".into(),
            ));
        }

        Ok(())
    }
}

impl Default for ActuatorSettings {
    fn default() -> Self {
        Self {
            moving_speed: 100,
            torque_enable: true,
            torque_control_enable: false,
            torque_limit: MAX_TORQUE_LIMIT,
            max_torque: MAX_TORQUE_LIMIT,
            synchronized: true,
        }
    }
}
