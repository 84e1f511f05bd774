//! Implementations for the PursuitCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::Vector2;
use serde::Serialize;
use std::f64::consts::{PI, TAU};

// Internal
use super::{Params, PursuitError};
use crate::kinematics::WorldPoint;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pursuit control module state
#[derive(Default)]
pub struct PursuitCtrl {
    pub(crate) params: Params,

    num_cycles: u64,

    record: Option<CycleRecord>,
    arch_cycle: Archiver,
}

/// Input data to pursuit control.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Position of the end effector from the latest update.
    ///
    /// Frame: World
    pub current_world: WorldPoint,

    /// Frame: World
    pub goal: WorldPoint,

    /// Region the end effector can't be sent into, if any.
    pub keep_out: Option<KeepOut>,
}

/// A disk hops must not end inside, such as the hole in the middle of the
/// reach of an arm with unequal links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeepOut {
    /// Frame: World
    pub centre: WorldPoint,

    /// Units: meters
    pub radius_m: f64,
}

/// Status report for pursuit control processing.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// Straight line distance from the current position to the goal.
    ///
    /// Units: meters
    pub distance_to_goal_m: f64,

    /// Direction of the goal from the current position, measured from the
    /// world x axis.
    ///
    /// Units: radians
    pub heading_rad: f64,

    /// The goal and current position coincide, so no hop was made.
    pub at_goal: bool,

    /// The straight hop ended in the keep out zone, so the hop follows the
    /// edge of the zone instead.
    pub skirting: bool,
}

/// A flattened record of one cycle, as written to the archive.
#[derive(Clone, Copy, Serialize, Debug)]
struct CycleRecord {
    cycle: u64,
    time_s: f64,
    current_x_m: f64,
    current_y_m: f64,
    goal_x_m: f64,
    goal_y_m: f64,
    target_x_m: f64,
    target_y_m: f64,
    distance_to_goal_m: f64,
    heading_rad: f64,
    skirting: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PursuitCtrl {
    /// Create the module directly from parameters, without a session.
    pub fn with_params(params: Params) -> Result<Self, PursuitError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Archive cycles to the given archiver instead of the session one.
    pub fn archive_to(&mut self, archiver: Archiver) {
        self.arch_cycle = archiver;
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Number of times `proc` has been run.
    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }
}

impl State for PursuitCtrl {
    type InitData = &'static str;
    type InitError = PursuitError;

    type InputData = InputData;
    type OutputData = WorldPoint;
    type StatusReport = StatusReport;
    type ProcError = PursuitError;

    /// Initialise the PursuitCtrl module.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(
        &mut self,
        init_data: Self::InitData,
        session: Option<&Session>,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;
        self.params.validate()?;

        if let Some(session) = session {
            self.arch_cycle = Archiver::from_path(session, "pursuit/cycle.csv")?;
        }

        Ok(())
    }

    /// Compute the point one step from the current position towards the goal.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let goal = input_data.goal;
        if !(goal.x().is_finite() && goal.y().is_finite()) {
            return Err(PursuitError::NonFiniteGoal(goal.x(), goal.y()));
        }

        let current = input_data.current_world;
        let to_goal: Vector2<f64> = goal.0 - current.0;
        let distance = to_goal.norm();

        let mut report = StatusReport {
            distance_to_goal_m: distance,
            heading_rad: to_goal.y.atan2(to_goal.x),
            at_goal: false,
            skirting: false,
        };

        // Direction is undefined on the goal itself
        let mut target = if distance > 0.0 {
            WorldPoint(current.0 + to_goal * (self.params.step_length_m / distance))
        } else {
            report.at_goal = true;
            current
        };

        if let Some(zone) = input_data.keep_out {
            if !report.at_goal && zone.contains(&target) {
                target = zone.skirt(&current, &goal, self.params.step_length_m);
                report.skirting = true;
            }
        }

        trace!(
            "PursuitCtrl: current ({:.4}, {:.4}), goal ({:.4}, {:.4}), target ({:.4}, {:.4})",
            current.x(),
            current.y(),
            goal.x(),
            goal.y(),
            target.x(),
            target.y()
        );

        self.num_cycles += 1;
        self.record = Some(CycleRecord {
            cycle: self.num_cycles,
            time_s: session::get_elapsed_seconds().unwrap_or(0.0),
            current_x_m: current.x(),
            current_y_m: current.y(),
            goal_x_m: goal.x(),
            goal_y_m: goal.y(),
            target_x_m: target.x(),
            target_y_m: target.y(),
            distance_to_goal_m: report.distance_to_goal_m,
            heading_rad: report.heading_rad,
            skirting: report.skirting,
        });

        Ok((target, report))
    }
}

impl KeepOut {
    /// True if the point is strictly inside the zone.
    pub fn contains(&self, point: &WorldPoint) -> bool {
        (point.0 - self.centre.0).norm() < self.radius_m
    }

    /// Hop around the edge of the zone, from the direction of `current` towards
    /// the direction of `goal`, by at most `step_length_m` of arc.
    ///
    /// The hop ends on the edge at the goal's direction once that is within
    /// one step. A goal directly opposite is approached clockwise.
    pub fn skirt(&self, current: &WorldPoint, goal: &WorldPoint, step_length_m: f64) -> WorldPoint {
        let from = current.0 - self.centre.0;
        let to = goal.0 - self.centre.0;

        let from_angle = from.y.atan2(from.x);

        // Shortest signed turn, in [-pi, pi)
        let turn = (to.y.atan2(to.x) - from_angle + PI).rem_euclid(TAU) - PI;
        let max_turn = step_length_m / self.radius_m;
        let angle = from_angle + clamp(&turn, &-max_turn, &max_turn);

        WorldPoint(self.centre.0 + Vector2::new(angle.cos(), angle.sin()) * self.radius_m)
    }
}

impl Archived for PursuitCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        if let Some(record) = self.record.take() {
            self.arch_cycle.serialise(record)?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
