//! # Arm Executable Parameters
//!
//! This module provide parameters for the arm executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::dxl::ActuatorSettings;
use serde::Deserialize;

use crate::sim_bus::SimBusParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ArmExecParams {
    /// First actuator id to scan for
    pub first_actuator_id: u8,

    /// Last actuator id to scan for, inclusive
    pub last_actuator_id: u8,

    pub shoulder_id: u8,

    pub elbow_id: u8,

    /// Settings applied to both actuators before control starts
    #[serde(default)]
    pub actuator_settings: ActuatorSettings,

    /// Goal used when none is given on the command line
    ///
    /// Units: meters,
    /// Frame: World
    pub goal_x_m: f64,
    pub goal_y_m: f64,

    /// Simulated bus to run against
    #[serde(default)]
    pub sim: SimBusParams,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() {
        let params: ArmExecParams = util::params::parse(
            r#"
            first_actuator_id = 1
            last_actuator_id = 4
            shoulder_id = 1
            elbow_id = 2
            goal_x_m = 1.0
            goal_y_m = 0.5

            [actuator_settings]
            moving_speed = 80
            torque_enable = true
            torque_control_enable = false
            torque_limit = 512
            max_torque = 1024
            synchronized = true

            [sim]
            actuators = [[1, 1024], [2, 4000]]
            "#,
        )
        .unwrap();

        assert_eq!(params.shoulder_id, 1);
        assert_eq!(params.actuator_settings.moving_speed, 80);
        assert_eq!(params.actuator_settings.torque_limit, 512);
        assert_eq!(params.sim.actuators, vec![(1, 1024), (2, 4000)]);
    }
}
