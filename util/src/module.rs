//! Cyclic module interface
//!
//! Control modules (pursuit control for example) are set up once from a
//! parameter file and then stepped once per control cycle. Hardware owning
//! objects such as the arm itself are not modules, since they need their bus
//! and handles at construction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module stepped once per control cycle.
pub trait State {
    /// Passed to `init`, normally the parameter file name relative to the
    /// params directory.
    type InitData;
    type InitError;

    /// Sampled inputs for one cycle.
    type InputData;
    /// Demand produced by one cycle.
    type OutputData;
    /// Diagnostics produced alongside the output, safe to discard.
    type StatusReport;
    type ProcError;

    /// Load parameters and, when a session is given, open the module's
    /// archives. Without a session nothing is written to disk.
    fn init(&mut self, init_data: Self::InitData, session: Option<&Session>)
        -> Result<(), Self::InitError>;

    /// Run one cycle.
    ///
    /// A failed cycle leaves the module able to run the next one, it is up to
    /// the caller whether to carry on.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
