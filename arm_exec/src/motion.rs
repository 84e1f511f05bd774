//! Joint motion resolution
//!
//! Actuators only report their position modulo one turn, so the angle of a
//! joint is held both as read (unwrapped) and normalised into `[0, 2pi)`
//! (wrapped). Demands are issued relative to the unwrapped angle, choosing
//! whichever of the equivalent targets needs the least rotation.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::kinematics::scale_to_circle;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

const TAU: f64 = std::f64::consts::TAU;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The angle of a single joint.
///
/// The wrapped value is always the unwrapped value modulo 2pi, the two are
/// only ever set together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct JointAngle {
    /// Units: radians, in `[0, 2pi)`
    wrapped: f64,

    /// Units: radians
    unwrapped: f64,
}

/// Conversion between a joint's physical angle and its actuator's position
/// units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointScale {
    /// Actuator position at which the joint angle is zero.
    ///
    /// Units: ticks
    pub offset_ticks: f64,

    /// Joint radians per actuator radian. The elbow's differential linkage
    /// gives it a ratio of 2.
    pub ratio: f64,

    /// Units: ticks/radian
    pub ticks_per_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointAngle {
    pub fn from_unwrapped(unwrapped_rad: f64) -> Self {
        Self {
            wrapped: scale_to_circle(unwrapped_rad),
            unwrapped: unwrapped_rad,
        }
    }

    /// Units: radians, in `[0, 2pi)`
    pub fn wrapped(&self) -> f64 {
        self.wrapped
    }

    /// Units: radians
    pub fn unwrapped(&self) -> f64 {
        self.unwrapped
    }
}

impl JointScale {
    /// Actuator position demand for a joint angle.
    pub fn to_ticks(&self, angle_rad: f64) -> i32 {
        (angle_rad * self.ticks_per_rad / self.ratio + self.offset_ticks).round() as i32
    }

    /// Joint angle for an actuator position.
    pub fn from_ticks(&self, ticks: i32) -> JointAngle {
        JointAngle::from_unwrapped((ticks as f64 - self.offset_ticks) * self.ratio / self.ticks_per_rad)
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Pick the unwrapped demand for a joint currently at `current` which reaches
/// `target_wrapped_rad` with the least rotation.
///
/// The target and its neighbours a turn either side are compared against the
/// current wrapped angle, and the smallest offset is applied to the current
/// unwrapped angle. On an exact tie the first candidate is kept, in the order
/// target, target + 2pi, target - 2pi.
pub fn resolve_min_rotation(target_wrapped_rad: f64, current: &JointAngle) -> f64 {
    let mut delta = current.wrapped - target_wrapped_rad;

    for candidate in &[target_wrapped_rad + TAU, target_wrapped_rad - TAU] {
        let candidate_delta = current.wrapped - candidate;
        if candidate_delta.abs() < delta.abs() {
            delta = candidate_delta;
        }
    }

    current.unwrapped - delta
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    const TICKS_PER_RAD: f64 = 4096.0 / TAU;

    #[test]
    fn test_joint_angle_invariant() {
        for &a in &[-20.0, -PI, 0.0, 1.0, TAU, 7.0, 100.0] {
            let j = JointAngle::from_unwrapped(a);
            assert_eq!(j.unwrapped(), a);
            assert!(j.wrapped() >= 0.0 && j.wrapped() < TAU);

            // Differ by a whole number of turns
            let turns = (j.unwrapped() - j.wrapped()) / TAU;
            assert!((turns - turns.round()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_min_rotation_across_wrap() {
        let current = JointAngle::from_unwrapped(7.0);
        let cmd = resolve_min_rotation(0.1, &current);

        assert!((cmd - current.unwrapped()).abs() <= PI);
        assert!((cmd - (0.1 + TAU)).abs() < 1e-12);
    }

    #[test]
    fn test_min_rotation_picks_nearest() {
        // Current just above zero, target just below a full turn: go backwards
        // through zero rather than forwards almost a whole turn.
        let current = JointAngle::from_unwrapped(0.1);
        let cmd = resolve_min_rotation(TAU - 0.1, &current);
        assert!((cmd - (-0.1)).abs() < 1e-12);

        // And the reverse
        let current = JointAngle::from_unwrapped(-0.1);
        let cmd = resolve_min_rotation(0.1, &current);
        assert!((cmd - 0.1).abs() < 1e-12);

        // Many turns in, the demand stays on the current turn
        let current = JointAngle::from_unwrapped(10.0 * TAU + 1.0);
        let cmd = resolve_min_rotation(1.5, &current);
        assert!((cmd - (10.0 * TAU + 1.5)).abs() < 1e-9);
    }

    #[test]
    fn test_min_rotation_never_exceeds_half_turn() {
        for i in 0..64 {
            let current = JointAngle::from_unwrapped(-9.0 + i as f64 * 0.37);
            for j in 0..32 {
                let target = j as f64 * TAU / 32.0;
                let cmd = resolve_min_rotation(target, &current);

                assert!((cmd - current.unwrapped()).abs() <= PI + 1e-9);
                let landed = scale_to_circle(cmd);
                assert!((landed - target).abs() < 1e-9 || (landed - target).abs() > TAU - 1e-9);
            }
        }
    }

    #[test]
    fn test_min_rotation_tie() {
        // Exactly half a turn away either way, any finite choice is fine
        let current = JointAngle::from_unwrapped(PI);
        let cmd = resolve_min_rotation(0.0, &current);
        assert!(cmd.is_finite());
        assert!((cmd - PI).abs() <= PI + 1e-12);
    }

    #[test]
    fn test_joint_scale() {
        let shoulder = JointScale {
            offset_ticks: 1024.0,
            ratio: 1.0,
            ticks_per_rad: TICKS_PER_RAD,
        };
        assert_eq!(shoulder.to_ticks(0.0), 1024);
        assert_eq!(shoulder.to_ticks(PI), 3072);
        assert!((shoulder.from_ticks(3072).unwrapped() - PI).abs() < 1e-12);

        // The elbow actuator turns half as far as the joint
        let elbow = JointScale {
            offset_ticks: 0.0,
            ratio: 2.0,
            ticks_per_rad: TICKS_PER_RAD,
        };
        assert_eq!(elbow.to_ticks(PI), 1024);
        assert!((elbow.from_ticks(1024).unwrapped() - PI).abs() < 1e-12);
        assert!((elbow.from_ticks(3072).wrapped() - PI).abs() < 1e-12);
    }
}
