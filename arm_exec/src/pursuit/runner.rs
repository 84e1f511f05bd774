//! The pursuit control loop

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::dxl::ActuatorBus;
use log::{debug, info, trace, warn};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use super::{CycleOutcome, GoalSource, InputData, KeepOut, PursuitCtrl, PursuitError, StopToken};
use crate::{arm_ctrl::Arm, kinematics::ArmPoint};
use util::{archive::Archived, module::State};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drives an arm after a goal, one hop per cycle.
pub struct PursuitLoop<B: ActuatorBus, G: GoalSource> {
    arm: Arm<B>,
    ctrl: PursuitCtrl,
    goal: G,

    /// A hop has been commanded, so arrival can be checked against it
    commanded: bool,

    consecutive_errors: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<B: ActuatorBus, G: GoalSource> PursuitLoop<B, G> {
    pub fn new(arm: Arm<B>, ctrl: PursuitCtrl, goal: G) -> Self {
        Self {
            arm,
            ctrl,
            goal,
            commanded: false,
            consecutive_errors: 0,
        }
    }

    /// Run cycles until the token is stopped, or until `max_cycles` have been
    /// run if given.
    ///
    /// The token is only checked between cycles. Returns the number of cycles
    /// run.
    pub fn run(&mut self, stop: &StopToken, max_cycles: Option<u64>) -> Result<u64, PursuitError> {
        let period = Duration::from_secs_f64(self.ctrl.params().cycle_period_s);
        let mut num_cycles = 0u64;

        info!(
            "Pursuit started, step length {} m, cycle period {} s",
            self.ctrl.params().step_length_m,
            period.as_secs_f64()
        );

        while !stop.is_stopped() {
            if max_cycles.map_or(false, |max| num_cycles >= max) {
                break;
            }

            let cycle_start = Instant::now();

            self.cycle()?;
            num_cycles += 1;

            let cycle_dur = cycle_start.elapsed();
            match period.checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None if period.as_nanos() > 0 => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - period.as_secs_f64()
                ),
                None => (),
            }
        }

        info!("Pursuit stopped after {} cycles", num_cycles);

        Ok(num_cycles)
    }

    /// Run exactly one cycle: an update of the arm followed by at most one
    /// move.
    ///
    /// A failing cycle is skipped, and only becomes an error once too many
    /// have failed in a row.
    pub fn cycle(&mut self) -> Result<CycleOutcome, PursuitError> {
        match self.try_cycle() {
            Ok(outcome) => {
                self.consecutive_errors = 0;
                Ok(outcome)
            }
            Err(e @ PursuitError::Archive(_)) => Err(e),
            Err(e) => self.skip(e),
        }
    }

    fn try_cycle(&mut self) -> Result<CycleOutcome, PursuitError> {
        self.arm.update()?;

        let goal = self.goal.goal();

        if self.ctrl.params().wait_for_arrival
            && self.commanded
            && !self.arm.near_goal_position()
        {
            trace!("Pursuit holding until the last hop is reached");
            return Ok(CycleOutcome::Held);
        }

        let (target, _) = self.ctrl.proc(&InputData {
            current_world: self.arm.current_position_world(),
            goal,
            keep_out: self.keep_out(),
        })?;

        let report = self.arm.move_to_goal(target)?;
        self.commanded = true;

        // Only hops which were actually commanded are archived
        self.ctrl.write()?;

        debug!(
            "Pursuit hop to ({:.4}, {:.4}) [reach limited: {}, x limited: {}, y limited: {}]",
            target.x(),
            target.y(),
            report.reach_limited,
            report.x_limited,
            report.y_limited
        );

        Ok(CycleOutcome::Commanded(target))
    }

    /// The hole in the middle of the arm's reach, none for equal links.
    fn keep_out(&self) -> Option<KeepOut> {
        let params = self.arm.params();
        let radius_m = params.min_reach_m();

        if radius_m > 0.0 {
            Some(KeepOut {
                centre: ArmPoint::new(0.0, 0.0).to_world(&params.mount_offset()),
                radius_m,
            })
        } else {
            None
        }
    }

    fn skip(&mut self, err: PursuitError) -> Result<CycleOutcome, PursuitError> {
        self.consecutive_errors += 1;
        let max = self.ctrl.params().max_consecutive_errors;

        warn!(
            "Skipping pursuit cycle ({} of {} allowed failures): {}",
            self.consecutive_errors, max, err
        );

        if self.consecutive_errors >= max {
            return Err(PursuitError::TooManyErrors {
                count: self.consecutive_errors,
                last: Box::new(err),
            });
        }

        Ok(CycleOutcome::Skipped)
    }

    /// Number of cycles which have failed since the last good one.
    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn arm(&self) -> &Arm<B> {
        &self.arm
    }

    pub fn arm_mut(&mut self) -> &mut Arm<B> {
        &mut self.arm
    }

    pub fn ctrl(&self) -> &PursuitCtrl {
        &self.ctrl
    }

    pub fn goal_source_mut(&mut self) -> &mut G {
        &mut self.goal
    }

    pub fn into_arm(self) -> Arm<B> {
        self.arm
    }
}
