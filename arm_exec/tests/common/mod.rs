//! Shared fixtures for the arm integration tests

#![allow(dead_code)]

use arm_lib::{
    arm_ctrl::{take_handle, Arm, Params},
    kinematics::inverse_kinematics,
    sim_bus::SimBus,
};
use comms_if::eqpt::dxl::{ActuatorBus, ActuatorSettings};

pub const SHOULDER_ID: u8 = 1;
pub const ELBOW_ID: u8 = 2;

/// Unit length links mounted at the world origin, with a workspace larger than
/// the reachable disk.
pub fn unit_params() -> Params {
    Params {
        l1_m: 1.0,
        l2_m: 1.0,
        horizontal_offset_m: 0.0,
        vertical_offset_m: 0.0,
        shoulder_offset_ticks: 0.0,
        elbow_offset_ticks: 0.0,
        shoulder_ratio: 1.0,
        elbow_ratio: 2.0,
        ticks_per_rad: 4096.0 / std::f64::consts::TAU,
        min_x_m: -3.0,
        max_x_m: 3.0,
        min_y_m: -3.0,
        max_y_m: 3.0,
        angle_threshold_rad: 0.02,
    }
}

/// Build a configured arm on a simulated bus with its actuators at the given
/// positions.
pub fn arm_at_ticks(
    params: Params,
    shoulder_ticks: i64,
    elbow_ticks: i64,
    moving_speed: u16,
) -> Arm<SimBus> {
    let mut bus = SimBus::new()
        .with_actuator(SHOULDER_ID, shoulder_ticks)
        .with_actuator(ELBOW_ID, elbow_ticks);

    let mut handles = bus.scan(1, 4).unwrap();
    let shoulder = take_handle(&mut handles, SHOULDER_ID).unwrap();
    let elbow = take_handle(&mut handles, ELBOW_ID).unwrap();

    let mut arm = Arm::new(bus, shoulder, elbow, params).unwrap();
    arm.configure_actuators(&ActuatorSettings {
        moving_speed,
        ..Default::default()
    })
    .unwrap();
    arm.update().unwrap();

    arm
}

/// Build a configured arm with its end effector at the given arm-frame point.
pub fn arm_at_point(params: Params, x: f64, y: f64, moving_speed: u16) -> Arm<SimBus> {
    let (theta1, theta2) = inverse_kinematics(x, y, params.l1_m, params.l2_m).unwrap();
    let shoulder_ticks = params.shoulder_scale().to_ticks(theta1) as i64;
    let elbow_ticks = params.elbow_scale().to_ticks(theta2) as i64;

    arm_at_ticks(params, shoulder_ticks, elbow_ticks, moving_speed)
}

/// Number of goal writes made to an actuator.
pub fn num_writes(arm: &Arm<SimBus>, id: u8) -> usize {
    arm.bus().goal_writes().iter().filter(|(i, _)| *i == id).count()
}
