//! Generic float helpers shared by the kinematics and limits code

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::{Float, FloatConst};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit a value to `[min, max]`.
///
/// Never panics. If `min > max` the result is `min`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float
{
    (*value).min(*max).max(*min)
}

/// Wrap an angle into `[0, 2pi)`.
///
/// Units: radians
pub fn wrap_2pi<T>(value: T) -> T
where
    T: Float + FloatConst
{
    let tau = T::PI() + T::PI();

    let mut r = value % tau;
    if r < T::zero() {
        r = r + tau;
    }

    // A tiny negative input rounds up to exactly tau
    if r >= tau { T::zero() } else { r }
}
