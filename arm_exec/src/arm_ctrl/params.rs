//! Parameters structure for ArmCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use super::ArmCtrlError;
use crate::motion::JointScale;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for Arm control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- GEOMETRY ----
    /// Length of the upper arm, from shoulder axis to elbow axis.
    ///
    /// Units: meters.
    pub l1_m: f64,

    /// Length of the forearm, from elbow axis to end effector.
    ///
    /// Units: meters.
    pub l2_m: f64,

    /// Position of the shoulder axis along the world x axis.
    ///
    /// Units: meters,
    /// Frame: World
    pub horizontal_offset_m: f64,

    /// Position of the shoulder axis along the world y axis.
    ///
    /// Units: meters,
    /// Frame: World
    pub vertical_offset_m: f64,

    // ---- ACTUATORS ----
    /// Shoulder actuator position at which the shoulder angle is zero.
    ///
    /// Units: ticks
    pub shoulder_offset_ticks: f64,

    /// Elbow actuator position at which the elbow angle is zero.
    ///
    /// Units: ticks
    pub elbow_offset_ticks: f64,

    /// Shoulder joint radians per actuator radian.
    #[serde(default = "default_shoulder_ratio")]
    pub shoulder_ratio: f64,

    /// Elbow joint radians per actuator radian.
    #[serde(default = "default_elbow_ratio")]
    pub elbow_ratio: f64,

    /// Actuator position units per radian of actuator rotation.
    ///
    /// Units: ticks/radian
    #[serde(default = "default_ticks_per_rad")]
    pub ticks_per_rad: f64,

    // ---- WORKSPACE ----
    /// Units: meters,
    /// Frame: Arm
    pub min_x_m: f64,

    /// Units: meters,
    /// Frame: Arm
    pub max_x_m: f64,

    /// Units: meters,
    /// Frame: Arm
    pub min_y_m: f64,

    /// Units: meters,
    /// Frame: Arm
    pub max_y_m: f64,

    /// Joint angle error under which a joint is considered to have reached
    /// its demand.
    ///
    /// Units: radians
    pub angle_threshold_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check the parameters describe a physically sensible arm.
    ///
    /// Link lengths and actuator scales must be positive, the workspace
    /// rectangle must be non-empty and must overlap the disk the arm can
    /// reach.
    pub fn validate(&self) -> Result<(), ArmCtrlError> {
        let positive = [
            ("l1_m", self.l1_m),
            ("l2_m", self.l2_m),
            ("shoulder_ratio", self.shoulder_ratio),
            ("elbow_ratio", self.elbow_ratio),
            ("ticks_per_rad", self.ticks_per_rad),
        ];
        for (name, value) in positive.iter() {
            if !(value.is_finite() && *value > 0.0) {
                return Err(ArmCtrlError::InvalidParams(format!(
                    "{} must be positive, found {}",
                    name, value
                )));
            }
        }

        if !(self.angle_threshold_rad >= 0.0) {
            return Err(ArmCtrlError::InvalidParams(format!(
                "angle_threshold_rad must not be negative, found {}",
                self.angle_threshold_rad
            )));
        }

        if !(self.min_x_m < self.max_x_m) || !(self.min_y_m < self.max_y_m) {
            return Err(ArmCtrlError::InvalidParams(format!(
                "Workspace x [{}, {}], y [{}, {}] is empty",
                self.min_x_m, self.max_x_m, self.min_y_m, self.max_y_m
            )));
        }

        // Closest point of the workspace to the shoulder
        let near_x = clamp(&0.0, &self.min_x_m, &self.max_x_m);
        let near_y = clamp(&0.0, &self.min_y_m, &self.max_y_m);
        if (near_x.powi(2) + near_y.powi(2)).sqrt() > self.reach_m() {
            return Err(ArmCtrlError::InvalidParams(format!(
                "Workspace does not intersect the reachable disk of radius {} m",
                self.reach_m()
            )));
        }

        Ok(())
    }

    /// Outer radius of the arm's reachable annulus.
    ///
    /// Units: meters
    pub fn reach_m(&self) -> f64 {
        self.l1_m + self.l2_m
    }

    /// Inner radius of the arm's reachable annulus, zero for equal links.
    ///
    /// Units: meters
    pub fn min_reach_m(&self) -> f64 {
        (self.l1_m - self.l2_m).abs()
    }

    /// Position of the shoulder axis in the world frame.
    pub fn mount_offset(&self) -> Vector2<f64> {
        Vector2::new(self.horizontal_offset_m, self.vertical_offset_m)
    }

    pub fn shoulder_scale(&self) -> JointScale {
        JointScale {
            offset_ticks: self.shoulder_offset_ticks,
            ratio: self.shoulder_ratio,
            ticks_per_rad: self.ticks_per_rad,
        }
    }

    pub fn elbow_scale(&self) -> JointScale {
        JointScale {
            offset_ticks: self.elbow_offset_ticks,
            ratio: self.elbow_ratio,
            ticks_per_rad: self.ticks_per_rad,
        }
    }
}

fn default_shoulder_ratio() -> f64 {
    1.0
}

fn default_elbow_ratio() -> f64 {
    2.0
}

fn default_ticks_per_rad() -> f64 {
    comms_if::eqpt::dxl::TICKS_PER_TURN as f64 / std::f64::consts::TAU
}
