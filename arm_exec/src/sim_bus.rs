//! Simulated actuator bus
//!
//! An in-memory network of position actuators used when no hardware is
//! attached, and by the tests. Each actuator tracks a continuous position but,
//! like the real encoders, only reports it modulo one turn.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::dxl::{
    ActuatorBus, ActuatorHandle, ActuatorSettings, Register, TransportError, TICKS_PER_TURN,
};
use log::{debug, trace};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Log target of the bus, which traces every register access.
pub const LOG_TARGET: &str = module_path!();

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated bus.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SimBusParams {
    /// Actuators present on the bus as `[id, initial position]` pairs.
    ///
    /// Units: ticks
    pub actuators: Vec<(u8, i64)>,
}

/// A simulated network of position actuators.
#[derive(Debug, Default)]
pub struct SimBus {
    actuators: BTreeMap<u8, SimActuator>,

    /// Actuators which have already been handed out by a scan
    bound: BTreeSet<u8>,

    /// Fail the next synchronisation with an IO error
    fail_next_sync: bool,

    /// Every goal write made, in order
    goal_writes: Vec<(u8, i32)>,

    num_syncs: u64,
}

#[derive(Debug)]
struct SimActuator {
    /// True position, not wrapped
    ///
    /// Units: ticks
    position: i64,

    /// Position being moved to
    ///
    /// Units: ticks
    target: i64,

    /// Goal written since the last synchronisation
    pending_goal: Option<i32>,

    settings: ActuatorSettings,

    /// Register values captured at the last synchronisation
    latest: HashMap<Register, i32>,

    /// Register values visible to readers
    cache: HashMap<Register, i32>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_params(params: &SimBusParams) -> Self {
        params
            .actuators
            .iter()
            .fold(Self::new(), |bus, (id, pos)| bus.with_actuator(*id, *pos))
    }

    /// Add an actuator at the given (unwrapped) position.
    pub fn with_actuator(mut self, id: u8, position_ticks: i64) -> Self {
        let mut act = SimActuator {
            position: position_ticks,
            target: position_ticks,
            pending_goal: None,
            settings: ActuatorSettings::default(),
            latest: HashMap::new(),
            cache: HashMap::new(),
        };
        act.capture();
        act.cache = act.latest.clone();

        self.actuators.insert(id, act);
        self
    }

    /// Make the next call to `synchronize` fail.
    pub fn fail_next_sync(&mut self) {
        self.fail_next_sync = true;
    }

    /// All goal positions written so far as `(id, ticks)`, oldest first.
    pub fn goal_writes(&self) -> &[(u8, i32)] {
        &self.goal_writes
    }

    /// True position of an actuator, without wrapping.
    pub fn position(&self, id: u8) -> Option<i64> {
        self.actuators.get(&id).map(|a| a.position)
    }

    pub fn num_syncs(&self) -> u64 {
        self.num_syncs
    }

    fn actuator(&self, handle: &ActuatorHandle) -> Result<&SimActuator, TransportError> {
        self.actuators
            .get(&handle.id())
            .ok_or(TransportError::UnknownActuator(handle.id()))
    }

    fn actuator_mut(
        &mut self,
        handle: &ActuatorHandle,
    ) -> Result<&mut SimActuator, TransportError> {
        self.actuators
            .get_mut(&handle.id())
            .ok_or(TransportError::UnknownActuator(handle.id()))
    }
}

impl SimActuator {
    fn reported_position(&self) -> i32 {
        self.position.rem_euclid(TICKS_PER_TURN as i64) as i32
    }

    /// Goals are relative to the reported position, so a goal below zero or
    /// above a full turn moves through the wrap rather than the long way
    /// round.
    fn apply_goal(&mut self, goal_ticks: i32) {
        self.target = self.position + (goal_ticks - self.reported_position()) as i64;
    }

    fn step(&mut self) {
        if !self.settings.torque_enable {
            return;
        }

        let speed = self.settings.moving_speed as i64;
        let diff = self.target - self.position;
        self.position += diff.signum() * diff.abs().min(speed);
    }

    fn capture(&mut self) {
        let moving = self.position != self.target;
        let goal = self.target - self.position + self.reported_position() as i64;

        self.latest
            .insert(Register::CurrentPosition, self.reported_position());
        self.latest.insert(Register::GoalPosition, goal as i32);
        self.latest.insert(Register::Moving, moving as i32);
        self.latest
            .insert(Register::MovingSpeed, self.settings.moving_speed as i32);
        self.latest
            .insert(Register::TorqueEnable, self.settings.torque_enable as i32);
        self.latest
            .insert(Register::TorqueLimit, self.settings.torque_limit as i32);
    }
}

impl ActuatorBus for SimBus {
    fn scan(&mut self, first_id: u8, last_id: u8) -> Result<Vec<ActuatorHandle>, TransportError> {
        let mut found = Vec::new();

        for id in first_id..=last_id {
            if self.actuators.contains_key(&id) && self.bound.insert(id) {
                found.push(ActuatorHandle::bind(id));
            }
        }

        if found.is_empty() {
            return Err(TransportError::NoneFound(first_id, last_id));
        }

        debug!(
            "SimBus scan found {:?}",
            found.iter().map(|h| h.id()).collect::<Vec<_>>()
        );

        Ok(found)
    }

    fn configure(
        &mut self,
        actuator: &ActuatorHandle,
        settings: &ActuatorSettings,
    ) -> Result<(), TransportError> {
        settings.validate()?;
        let act = self.actuator_mut(actuator)?;
        act.settings = settings.clone();
        act.capture();

        Ok(())
    }

    fn synchronize(&mut self) -> Result<(), TransportError> {
        if self.fail_next_sync {
            self.fail_next_sync = false;
            return Err(TransportError::Io("simulated synchronisation failure".into()));
        }

        for act in self.actuators.values_mut() {
            if let Some(goal) = act.pending_goal.take() {
                act.apply_goal(goal);
            }
            act.step();
            act.capture();
        }

        self.num_syncs += 1;

        Ok(())
    }

    fn read_all(&mut self, actuator: &ActuatorHandle) -> Result<(), TransportError> {
        let act = self.actuator_mut(actuator)?;
        act.cache = act.latest.clone();

        Ok(())
    }

    fn cached(&self, actuator: &ActuatorHandle, register: Register) -> Result<i32, TransportError> {
        self.actuator(actuator)?
            .cache
            .get(&register)
            .copied()
            .ok_or(TransportError::Timeout(actuator.id()))
    }

    fn set_goal_position(
        &mut self,
        actuator: &ActuatorHandle,
        goal_ticks: i32,
    ) -> Result<(), TransportError> {
        let id = actuator.id();
        let act = self.actuator_mut(actuator)?;

        if act.settings.synchronized {
            act.pending_goal = Some(goal_ticks);
        } else {
            act.apply_goal(goal_ticks);
        }

        trace!("SimBus actuator {} goal {} ticks", id, goal_ticks);
        self.goal_writes.push((id, goal_ticks));

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
