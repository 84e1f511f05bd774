//! Implementations for the Arm controller

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::dxl::{ActuatorBus, ActuatorHandle, ActuatorSettings};
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{ArmCtrlError, Params};
use crate::{
    kinematics::{
        bound_outside_inner_reach, bound_within_goal, bound_within_robot_reach,
        forward_kinematics, inverse_kinematics,
        scale_to_circle, within_threshold, ArmPoint, WorldPoint,
    },
    motion::{resolve_min_rotation, JointAngle, JointScale},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A two-link arm and the actuators driving it.
///
/// The arm exclusively owns its shoulder and elbow actuator handles. Joint
/// angles are cached on each [`update`](Self::update), and the last demanded
/// angles are kept so arrival can be checked against them.
pub struct Arm<B: ActuatorBus> {
    bus: B,

    shoulder: ActuatorHandle,
    elbow: ActuatorHandle,

    params: Params,
    shoulder_scale: JointScale,
    elbow_scale: JointScale,

    /// Joint angles read on the last update
    shoulder_pos: JointAngle,
    elbow_pos: JointAngle,

    /// Last demanded (unwrapped) joint angles
    ///
    /// Units: radians
    shoulder_angle: f64,
    elbow_angle: f64,

    /// Last demanded actuator positions
    ///
    /// Units: ticks
    shoulder_cmd_ticks: i32,
    elbow_cmd_ticks: i32,
}

/// Status report for a single move of the arm.
#[derive(Clone, Copy, Default, Serialize, Debug, PartialEq)]
pub struct StatusReport {
    /// The target was moved onto the edge of the reachable annulus, either
    /// pulled in from outside or pushed out of the inner hole.
    pub reach_limited: bool,

    /// The target's x coordinate was clamped to the workspace.
    pub x_limited: bool,

    /// The target's y coordinate was clamped to the workspace.
    pub y_limited: bool,

    /// The bounded target that was commanded.
    ///
    /// Frame: Arm
    pub target_x_m: f64,
    pub target_y_m: f64,

    /// Actuator demands issued.
    ///
    /// Units: ticks
    pub shoulder_cmd_ticks: i32,
    pub elbow_cmd_ticks: i32,
}

/// Snapshot of the arm's state, saved to the session on exit.
#[derive(Clone, Copy, Serialize, Debug)]
pub struct ArmSnapshot {
    pub shoulder: JointAngle,
    pub elbow: JointAngle,
    pub shoulder_demand_rad: f64,
    pub elbow_demand_rad: f64,
    pub position: WorldPoint,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<B: ActuatorBus> Arm<B> {
    /// Build an arm from a bus, the handles of its two actuators and its
    /// parameters.
    ///
    /// No bus traffic happens here, call [`update`](Self::update) before
    /// reading any positions.
    pub fn new(
        bus: B,
        shoulder: ActuatorHandle,
        elbow: ActuatorHandle,
        params: Params,
    ) -> Result<Self, ArmCtrlError> {
        params.validate()?;

        Ok(Self {
            bus,
            shoulder,
            elbow,
            shoulder_scale: params.shoulder_scale(),
            elbow_scale: params.elbow_scale(),
            params,
            shoulder_pos: JointAngle::default(),
            elbow_pos: JointAngle::default(),
            shoulder_angle: 0.0,
            elbow_angle: 0.0,
            shoulder_cmd_ticks: 0,
            elbow_cmd_ticks: 0,
        })
    }

    /// Apply the given speed and torque settings to both actuators.
    pub fn configure_actuators(&mut self, settings: &ActuatorSettings) -> Result<(), ArmCtrlError> {
        settings.validate()?;

        for act in [&self.shoulder, &self.elbow].iter() {
            self.bus.configure(act, settings)?;
            debug!("Configured actuator {}: {:?}", act.id(), settings);
        }

        Ok(())
    }

    /// Synchronise the bus and refresh the cached joint angles.
    pub fn update(&mut self) -> Result<(), ArmCtrlError> {
        self.bus.synchronize()?;
        self.bus.read_all(&self.shoulder)?;
        self.bus.read_all(&self.elbow)?;

        self.shoulder_pos = self
            .shoulder_scale
            .from_ticks(self.bus.current_position(&self.shoulder)?);
        self.elbow_pos = self
            .elbow_scale
            .from_ticks(self.bus.current_position(&self.elbow)?);

        trace!(
            "Arm joints: shoulder {:.4} ({:.4}) rad, elbow {:.4} ({:.4}) rad",
            self.shoulder_pos.wrapped(),
            self.shoulder_pos.unwrapped(),
            self.elbow_pos.wrapped(),
            self.elbow_pos.unwrapped()
        );

        Ok(())
    }

    /// Move the end effector towards a point given in the world frame.
    ///
    /// The point is pulled in onto the reachable circle and then clamped into
    /// the workspace. Last, a point inside the inner hole of an arm with
    /// unequal links is pushed out onto the inner circle, since no joint
    /// angles reach it. The report says which limits were applied.
    pub fn move_to_goal(&mut self, goal: WorldPoint) -> Result<StatusReport, ArmCtrlError> {
        let mut report = StatusReport::default();

        let local = goal.to_arm(&self.params.mount_offset());

        let (x, y) = bound_within_robot_reach(local.x(), local.y(), self.params.reach_m());
        report.reach_limited = x != local.x() || y != local.y();

        let clamped_x = bound_within_goal(x, self.params.max_x_m, self.params.min_x_m);
        let clamped_y = bound_within_goal(y, self.params.max_y_m, self.params.min_y_m);
        report.x_limited = clamped_x != x;
        report.y_limited = clamped_y != y;

        let (bounded_x, bounded_y) =
            bound_outside_inner_reach(clamped_x, clamped_y, self.params.min_reach_m());
        if bounded_x != clamped_x || bounded_y != clamped_y {
            trace!(
                "Target ({:.4}, {:.4}) is inside the inner reach, using ({:.4}, {:.4})",
                clamped_x,
                clamped_y,
                bounded_x,
                bounded_y
            );
            report.reach_limited = true;
        }

        self.move_to_xy(ArmPoint::new(bounded_x, bounded_y))?;

        report.target_x_m = bounded_x;
        report.target_y_m = bounded_y;
        report.shoulder_cmd_ticks = self.shoulder_cmd_ticks;
        report.elbow_cmd_ticks = self.elbow_cmd_ticks;

        Ok(report)
    }

    /// Move the end effector to a point in the arm frame.
    ///
    /// Nothing is commanded if the point can't be reached.
    pub fn move_to_xy(&mut self, target: ArmPoint) -> Result<(), ArmCtrlError> {
        let (theta1, theta2) =
            inverse_kinematics(target.x(), target.y(), self.params.l1_m, self.params.l2_m)?;

        let shoulder_dem = resolve_min_rotation(theta1, &self.shoulder_pos);
        let elbow_dem = resolve_min_rotation(theta2, &self.elbow_pos);

        self.move_to_theta(shoulder_dem, elbow_dem)
    }

    /// Demand unwrapped joint angles from the actuators.
    pub fn move_to_theta(&mut self, theta1: f64, theta2: f64) -> Result<(), ArmCtrlError> {
        self.shoulder_angle = theta1;
        self.elbow_angle = theta2;

        self.shoulder_cmd_ticks = self.shoulder_scale.to_ticks(theta1);
        self.elbow_cmd_ticks = self.elbow_scale.to_ticks(theta2);

        debug!(
            "Arm demand: shoulder {:.4} rad ({} ticks), elbow {:.4} rad ({} ticks)",
            theta1, self.shoulder_cmd_ticks, theta2, self.elbow_cmd_ticks
        );

        self.bus
            .set_goal_position(&self.shoulder, self.shoulder_cmd_ticks)?;
        self.bus.set_goal_position(&self.elbow, self.elbow_cmd_ticks)?;

        Ok(())
    }

    /// True if either actuator reports it is still moving.
    pub fn is_moving(&self) -> Result<bool, ArmCtrlError> {
        Ok(self.bus.is_moving(&self.shoulder)? || self.bus.is_moving(&self.elbow)?)
    }

    /// True if both joints are within the angle threshold of their last
    /// demand.
    pub fn near_goal_position(&self) -> bool {
        let thresh = self.params.angle_threshold_rad;

        within_threshold(
            scale_to_circle(self.shoulder_pos.wrapped() - self.shoulder_angle),
            thresh,
        ) && within_threshold(
            scale_to_circle(self.elbow_pos.wrapped() - self.elbow_angle),
            thresh,
        )
    }

    /// Joint angles read on the last update, shoulder first.
    pub fn current_positions(&self) -> (JointAngle, JointAngle) {
        (self.shoulder_pos, self.elbow_pos)
    }

    /// End effector position from the last update.
    ///
    /// Frame: World
    pub fn current_position_world(&self) -> WorldPoint {
        let (x, y) = forward_kinematics(
            self.shoulder_pos.wrapped(),
            self.elbow_pos.wrapped(),
            self.params.l1_m,
            self.params.l2_m,
        );

        ArmPoint::new(x, y).to_world(&self.params.mount_offset())
    }

    /// Last demanded unwrapped joint angles, shoulder first.
    ///
    /// Units: radians
    pub fn commanded_angles(&self) -> (f64, f64) {
        (self.shoulder_angle, self.elbow_angle)
    }

    pub fn snapshot(&self) -> ArmSnapshot {
        ArmSnapshot {
            shoulder: self.shoulder_pos,
            elbow: self.elbow_pos,
            shoulder_demand_rad: self.shoulder_angle,
            elbow_demand_rad: self.elbow_angle,
            position: self.current_position_world(),
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}
