//! Arm control against the simulated actuator bus

mod common;

use arm_lib::{
    arm_ctrl::ArmCtrlError,
    kinematics::{forward_kinematics, inverse_kinematics, ArmPoint, WorldPoint},
};
use common::*;
use std::f64::consts::TAU;

/// Position error from quantising the joint angles to whole ticks.
const TICK_TOL_M: f64 = 5e-3;

fn commanded_point(arm: &arm_lib::arm_ctrl::Arm<arm_lib::sim_bus::SimBus>) -> (f64, f64) {
    let (t1, t2) = arm.commanded_angles();
    forward_kinematics(t1, t2, arm.params().l1_m, arm.params().l2_m)
}

fn last_write(arm: &arm_lib::arm_ctrl::Arm<arm_lib::sim_bus::SimBus>, id: u8) -> i32 {
    arm.bus()
        .goal_writes()
        .iter()
        .rev()
        .find(|(i, _)| *i == id)
        .map(|(_, t)| *t)
        .unwrap()
}

#[test]
fn test_current_position_from_encoders() {
    let arm = arm_at_point(unit_params(), 1.5, 0.0, 100);

    let pos = arm.current_position_world();
    assert!((pos.x() - 1.5).abs() < TICK_TOL_M);
    assert!(pos.y().abs() < TICK_TOL_M);
}

#[test]
fn test_mount_offset() {
    let mut params = unit_params();
    params.horizontal_offset_m = 0.5;
    params.vertical_offset_m = 0.25;
    let mut arm = arm_at_point(params, 1.5, 0.0, 100);

    let pos = arm.current_position_world();
    assert!((pos.x() - 2.0).abs() < TICK_TOL_M);
    assert!((pos.y() - 0.25).abs() < TICK_TOL_M);

    // Goal is given in the world frame, the target is reported in the arm's
    let report = arm.move_to_goal(WorldPoint::new(2.1, 0.25)).unwrap();
    assert!((report.target_x_m - 1.6).abs() < 1e-12);
    assert!(report.target_y_m.abs() < 1e-12);
    assert!(!report.reach_limited && !report.x_limited && !report.y_limited);
}

#[test]
fn test_move_to_goal_clamped_to_workspace() {
    let mut params = unit_params();
    params.max_x_m = 1.55;
    let mut arm = arm_at_point(params, 1.5, 0.0, 100);

    let report = arm.move_to_goal(WorldPoint::new(1.6, 0.0)).unwrap();

    assert!(report.x_limited);
    assert!(!report.y_limited);
    assert!(!report.reach_limited);
    assert_eq!(report.target_x_m, 1.55);

    let (x, y) = commanded_point(&arm);
    assert!((x - 1.55).abs() < 1e-9);
    assert!(y.abs() < 1e-9);

    assert_eq!(report.shoulder_cmd_ticks, last_write(&arm, SHOULDER_ID));
    assert_eq!(report.elbow_cmd_ticks, last_write(&arm, ELBOW_ID));
}

#[test]
fn test_move_to_goal_beyond_reach() {
    let mut arm = arm_at_point(unit_params(), 1.5, 0.0, 100);

    let report = arm.move_to_goal(WorldPoint::new(5.0, 0.0)).unwrap();
    assert!(report.reach_limited);
    assert!((report.target_x_m - 2.0).abs() < 1e-12);

    let (x, y) = commanded_point(&arm);
    assert!((x - 2.0).abs() < 1e-6);
    assert!(y.abs() < 1e-6);
}

#[test]
fn test_clamp_outside_reach_skips_command() {
    // The workspace corner nearest the clipped target is outside the disk
    let mut params = unit_params();
    params.min_y_m = 1.0;
    params.max_y_m = 1.5;
    let mut arm = arm_at_point(params, 1.0, 1.0, 100);

    let res = arm.move_to_goal(WorldPoint::new(3.0, 0.0));

    assert!(matches!(res, Err(ArmCtrlError::OutOfReach(_))));
    assert!(arm.bus().goal_writes().is_empty());
}

#[test]
fn test_inner_annulus_out_of_reach() {
    let mut params = unit_params();
    params.l2_m = 0.5;
    let mut arm = arm_at_point(params, 1.2, 0.0, 100);

    let res = arm.move_to_xy(ArmPoint::new(0.1, 0.0));

    assert!(matches!(res, Err(ArmCtrlError::OutOfReach(_))));
    assert!(arm.bus().goal_writes().is_empty());
}

#[test]
fn test_move_to_goal_pushed_out_of_inner_hole() {
    let mut params = unit_params();
    params.l2_m = 0.5;
    let mut arm = arm_at_point(params, 1.2, 0.0, 100);

    // Inside the 0.5 m hole, pushed out along the same direction
    let report = arm.move_to_goal(WorldPoint::new(0.3, 0.0)).unwrap();
    assert!(report.reach_limited);
    assert!(!report.x_limited && !report.y_limited);
    assert!((report.target_x_m - 0.5).abs() < 1e-12);
    assert_eq!(report.target_y_m, 0.0);

    let (x, y) = commanded_point(&arm);
    assert!((x - 0.5).abs() < 1e-6);
    assert!(y.abs() < 1e-6);

    // The shoulder axis itself has no direction, a fixed one is used
    let report = arm.move_to_goal(WorldPoint::new(0.0, 0.0)).unwrap();
    assert!(report.reach_limited);
    assert_eq!((report.target_x_m, report.target_y_m), (0.5, 0.0));
    assert_eq!(num_writes(&arm, SHOULDER_ID), 2);
}

#[test]
fn test_wraparound_across_encoder_zero() {
    // Shoulder a few ticks below a full turn, elbow at 1 rad
    let mut arm = arm_at_ticks(unit_params(), 4090, 326, 100);
    assert!(arm.current_positions().0.wrapped() > TAU - 0.01);

    // Target needs the shoulder just past zero
    let (x, y) = forward_kinematics(0.05, 1.0, 1.0, 1.0);
    arm.move_to_xy(ArmPoint::new(x, y)).unwrap();

    // The demand continues past a full turn rather than winding back to 0.05
    let shoulder_cmd = last_write(&arm, SHOULDER_ID);
    assert!(shoulder_cmd > 4096 && shoulder_cmd < 4140);
    assert!((arm.commanded_angles().0 - (TAU + 0.05)).abs() < 1e-9);

    arm.update().unwrap();

    assert_eq!(arm.bus().position(SHOULDER_ID), Some(shoulder_cmd as i64));
    assert!(arm.current_positions().0.wrapped() < 0.06);
    assert!(!arm.is_moving().unwrap());
    assert!(arm.near_goal_position());

    let pos = arm.current_position_world();
    assert!((pos.x() - x).abs() < TICK_TOL_M);
    assert!((pos.y() - y).abs() < TICK_TOL_M);
}

#[test]
fn test_wraparound_backwards_across_encoder_zero() {
    let mut arm = arm_at_ticks(unit_params(), 5, 326, 100);

    let (x, y) = forward_kinematics(-0.05, 1.0, 1.0, 1.0);
    let (theta1, _) = inverse_kinematics(x, y, 1.0, 1.0).unwrap();
    assert!(theta1 > TAU - 0.06);

    arm.move_to_xy(ArmPoint::new(x, y)).unwrap();

    let shoulder_cmd = last_write(&arm, SHOULDER_ID);
    assert!(shoulder_cmd < 0 && shoulder_cmd > -40);

    arm.update().unwrap();

    // Moved back through zero, the encoder now reads near a full turn
    assert_eq!(arm.bus().position(SHOULDER_ID), Some(shoulder_cmd as i64));
    assert!(arm.current_positions().0.wrapped() > TAU - 0.06);
    assert!(arm.near_goal_position());
}

#[test]
fn test_is_moving_until_arrival() {
    let mut arm = arm_at_point(unit_params(), 1.5, 0.0, 5);

    arm.move_to_goal(WorldPoint::new(1.0, 1.0)).unwrap();
    arm.update().unwrap();

    assert!(arm.is_moving().unwrap());
    assert!(!arm.near_goal_position());

    let mut syncs = 0;
    while arm.is_moving().unwrap() {
        arm.update().unwrap();
        syncs += 1;
        assert!(syncs < 500, "arm never arrived");
    }

    assert!(arm.near_goal_position());

    let pos = arm.current_position_world();
    assert!((pos.x() - 1.0).abs() < TICK_TOL_M);
    assert!((pos.y() - 1.0).abs() < TICK_TOL_M);
}

#[test]
fn test_transport_error_surfaces_from_update() {
    let mut arm = arm_at_point(unit_params(), 1.5, 0.0, 100);
    arm.bus_mut().fail_next_sync();

    assert!(matches!(arm.update(), Err(ArmCtrlError::Transport(_))));
    assert!(arm.update().is_ok());
}

#[test]
fn test_invalid_params_rejected() {
    let mut params = unit_params();
    params.l1_m = -1.0;

    let mut bus = arm_lib::sim_bus::SimBus::new()
        .with_actuator(SHOULDER_ID, 0)
        .with_actuator(ELBOW_ID, 0);
    let mut handles = comms_if::eqpt::dxl::ActuatorBus::scan(&mut bus, 1, 2).unwrap();
    let elbow = handles.remove(1);
    let shoulder = handles.remove(0);

    assert!(matches!(
        arm_lib::arm_ctrl::Arm::new(bus, shoulder, elbow, params),
        Err(ArmCtrlError::InvalidParams(_))
    ));
}
