//! # Equipment Interface
//!
//! This module defines the interfaces through which equipment is accessed.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod dxl;
