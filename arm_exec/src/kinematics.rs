//! Planar two-link arm kinematics
//!
//! All angles are in radians and all lengths in meters. Joint 1 (the
//! shoulder) rotates about the arm-local origin, joint 2 (the elbow) is
//! measured relative to the first link.
//!
//! Points carry their frame in their type: [`WorldPoint`] is in the world
//! frame the goal is given in, [`ArmPoint`] is relative to the shoulder axis.
//! The two differ by the arm's mounting offset.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{Point2, Vector2};
use serde::Serialize;

// Internal
use util::maths::{clamp, wrap_2pi};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const TAU: f64 = std::f64::consts::TAU;

/// Relative amount by which a square root argument in the IK may fall below
/// zero and still be treated as zero. Absorbs rounding for targets exactly on
/// the edge of the reachable annulus.
const RADICAND_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A point in the world frame.
///
/// Units: meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldPoint(pub Point2<f64>);

/// A point in the arm-local frame, with the shoulder axis at the origin.
///
/// Units: meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArmPoint(pub Point2<f64>);

/// A target was outside the annulus the arm can reach.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error(
    "Target ({x:.4}, {y:.4}) is outside the reachable annulus \
     [{min_reach_m:.4}, {max_reach_m:.4}] m"
)]
pub struct OutOfReach {
    pub x: f64,
    pub y: f64,
    pub min_reach_m: f64,
    pub max_reach_m: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl WorldPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Express this point in the frame of an arm mounted at `mount_offset`.
    pub fn to_arm(&self, mount_offset: &Vector2<f64>) -> ArmPoint {
        ArmPoint(self.0 - mount_offset)
    }
}

impl ArmPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self(Point2::new(x, y))
    }

    pub fn x(&self) -> f64 {
        self.0.x
    }

    pub fn y(&self) -> f64 {
        self.0.y
    }

    /// Express this point in the world frame, given the arm's `mount_offset`.
    pub fn to_world(&self, mount_offset: &Vector2<f64>) -> WorldPoint {
        WorldPoint(self.0 + mount_offset)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Position of the end effector for the given joint angles.
///
/// Frame: arm-local
pub fn forward_kinematics(theta1: f64, theta2: f64, l1: f64, l2: f64) -> (f64, f64) {
    (
        l1 * theta1.cos() + l2 * (theta1 + theta2).cos(),
        l1 * theta1.sin() + l2 * (theta1 + theta2).sin(),
    )
}

/// Joint angles which place the end effector at `(x, y)`.
///
/// The elbow angle is found from the half angle form of the law of cosines,
/// which always gives `theta2` in `[0, pi]`. The mirrored solution is
/// available from [`alternate_elbow_solution`]. Both angles are returned
/// wrapped into `[0, 2pi)`.
///
/// The target must lie in the annulus `|l1 - l2| <= r <= l1 + l2`, otherwise
/// [`OutOfReach`] is returned.
pub fn inverse_kinematics(x: f64, y: f64, l1: f64, l2: f64) -> Result<(f64, f64), OutOfReach> {
    let out_of_reach = OutOfReach {
        x,
        y,
        min_reach_m: (l1 - l2).abs(),
        max_reach_m: l1 + l2,
    };

    let r_sq = x.powi(2) + y.powi(2);
    let outer = (l1 + l2).powi(2) - r_sq;
    let inner = r_sq - (l1 - l2).powi(2);
    let tolerance = RADICAND_TOLERANCE * (l1 + l2).powi(2);

    if !outer.is_finite() || !inner.is_finite() || outer < -tolerance || inner < -tolerance {
        return Err(out_of_reach);
    }

    let theta2 = 2.0 * outer.max(0.0).sqrt().atan2(inner.max(0.0).sqrt());
    let theta1 = y.atan2(x) - (l2 * theta2.sin()).atan2(l1 + l2 * theta2.cos());

    Ok((scale_to_circle(theta1), scale_to_circle(theta2)))
}

/// The other elbow configuration reaching the same point as `(theta1,
/// theta2)`, which must be a solution for `(x, y)`.
///
/// The first link is reflected about the line from the origin to the target
/// and the elbow bends the other way.
pub fn alternate_elbow_solution(x: f64, y: f64, theta1: f64, theta2: f64) -> (f64, f64) {
    let angle_to_endpoint = scale_to_circle(y.atan2(x));

    (
        scale_to_circle(theta1 + 2.0 * (angle_to_endpoint - theta1)),
        scale_to_circle(-theta2),
    )
}

/// Pull `(x, y)` onto the circle of the given radius if it lies outside it,
/// keeping its direction from the origin.
pub fn bound_within_robot_reach(x: f64, y: f64, radius: f64) -> (f64, f64) {
    if (x.powi(2) + y.powi(2)).sqrt() > radius {
        let angle = y.atan2(x);
        (radius * angle.cos(), radius * angle.sin())
    } else {
        (x, y)
    }
}

/// Push `(x, y)` out onto the circle of the given radius if it lies inside
/// it, keeping its direction from the origin.
///
/// The origin itself has no direction and goes to `(radius, 0)`.
pub fn bound_outside_inner_reach(x: f64, y: f64, radius: f64) -> (f64, f64) {
    let r = (x.powi(2) + y.powi(2)).sqrt();

    if r >= radius {
        (x, y)
    } else if r > 0.0 {
        (x * radius / r, y * radius / r)
    } else {
        (radius, 0.0)
    }
}

/// Clamp a single coordinate between `lower` and `upper`.
pub fn bound_within_goal(value: f64, upper: f64, lower: f64) -> f64 {
    clamp(&value, &lower, &upper)
}

/// Wrap an angle into `[0, 2pi)`.
pub fn scale_to_circle(angle_rad: f64) -> f64 {
    wrap_2pi(angle_rad)
}

/// True if an angular difference is within `thresh` of zero, treating a
/// difference of nearly a full turn as nearly zero.
pub fn within_threshold(difference: f64, thresh: f64) -> bool {
    difference.abs() <= thresh || (difference.abs() - TAU).abs() <= thresh
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
