//! # Communications interface crate.
//!
//! Provides the interfaces between the arm software and the equipment it
//! drives.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Interface definitions for equipment (like actuators)
pub mod eqpt;
