//! Parameters structure for pursuit control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::PursuitError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for pursuit control.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Length of the hop made towards the goal each cycle.
    ///
    /// Units: meters
    pub step_length_m: f64,

    /// Target period of one cycle, zero to run cycles back to back.
    ///
    /// Units: seconds
    #[serde(default)]
    pub cycle_period_s: f64,

    /// Only issue a new hop once the arm has reached the last one.
    #[serde(default)]
    pub wait_for_arrival: bool,

    /// Number of cycles in a row which may fail before pursuit gives up.
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    pub fn validate(&self) -> Result<(), PursuitError> {
        if !(self.step_length_m.is_finite() && self.step_length_m > 0.0) {
            return Err(PursuitError::InvalidParams(format!(
                "step_length_m must be positive, found {}",
                self.step_length_m
            )));
        }

        if !(self.cycle_period_s.is_finite() && self.cycle_period_s >= 0.0) {
            return Err(PursuitError::InvalidParams(format!(
                "cycle_period_s must not be negative, found {}",
                self.cycle_period_s
            )));
        }

        if self.max_consecutive_errors == 0 {
            return Err(PursuitError::InvalidParams(
                "max_consecutive_errors must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

fn default_max_consecutive_errors() -> u32 {
    5
}
