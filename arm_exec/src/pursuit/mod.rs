//! Pursuit control module
//!
//! Each cycle the arm is sent a short, fixed length hop from where it is
//! towards wherever the goal currently is. A moving goal is tracked and a
//! fixed goal is approached in equal steps, after which the arm keeps hopping
//! back and forth across it unless arrival gating is enabled.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod runner;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

// Internal
pub use params::*;
pub use runner::*;
pub use state::*;

use crate::{arm_ctrl::ArmCtrlError, kinematics::WorldPoint};
use util::{archive::ArchiveError, params::LoadError};

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A source of the goal point, sampled once per cycle.
pub trait GoalSource {
    /// Frame: World
    fn goal(&mut self) -> WorldPoint;
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Token used to stop a running pursuit loop.
///
/// Clones share the same flag. The loop only checks it between cycles, so a
/// bus transaction in progress always completes.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// What happened during a single pursuit cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CycleOutcome {
    /// The arm was sent towards this stepped point.
    Commanded(WorldPoint),

    /// The arm was still short of its last demand so no new hop was issued.
    Held,

    /// The cycle failed and was abandoned without commanding the arm.
    Skipped,
}

/// Possible errors that can occur during pursuit.
#[derive(Debug, thiserror::Error)]
pub enum PursuitError {
    #[error("Could not load the pursuit parameters: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid pursuit parameters: {0}")]
    InvalidParams(String),

    #[error("Pursuit archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Goal ({0}, {1}) is not a finite point")]
    NonFiniteGoal(f64, f64),

    #[error(transparent)]
    Arm(#[from] ArmCtrlError),

    #[error("{count} consecutive pursuit cycles failed, last error: {last}")]
    TooManyErrors {
        count: u32,
        last: Box<PursuitError>,
    },
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GoalSource for WorldPoint {
    fn goal(&mut self) -> WorldPoint {
        *self
    }
}

impl<F> GoalSource for F
where
    F: FnMut() -> WorldPoint,
{
    fn goal(&mut self) -> WorldPoint {
        self()
    }
}

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_stop_token_shared() {
        let token = StopToken::new();
        let other = token.clone();
        assert!(!token.is_stopped());

        other.stop();
        assert!(token.is_stopped());
    }

    #[test]
    fn test_goal_sources() {
        let mut fixed = WorldPoint::new(1.0, 2.0);
        assert_eq!(fixed.goal(), WorldPoint::new(1.0, 2.0));

        let mut t = 0.0;
        let mut moving = move || {
            t += 1.0;
            WorldPoint::new(t, 0.0)
        };
        assert_eq!(GoalSource::goal(&mut moving), WorldPoint::new(1.0, 0.0));
        assert_eq!(GoalSource::goal(&mut moving), WorldPoint::new(2.0, 0.0));
    }
}
