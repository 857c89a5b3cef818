//! Per-joint torque-mode override and enable masks.

use manip_common::event::ControllerEvent;
use manip_common::joints::JointVector;

use super::{DT, build, two_joint_toml};

#[test]
fn torque_mode_passes_desired_torque_through() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller
        .set_desired_position(&JointVector::filled(2, 0.5))
        .unwrap();
    controller
        .enable_torque_mode(&JointVector::from_slice(&[true, false]).unwrap())
        .unwrap();
    controller
        .set_desired_torque(&JointVector::from_slice(&[7.5, 0.0]).unwrap())
        .unwrap();

    controller.tick(DT);

    let torque = controller.port().applied_torque();
    assert_eq!(torque[0], 7.5);
    // Joint 1 still runs PID toward its setpoint.
    assert!(torque[1] > 0.0);
}

#[test]
fn torque_mode_snaps_desired_position_to_measured() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller
        .set_desired_position(&JointVector::filled(2, 0.5))
        .unwrap();
    controller
        .enable_torque_mode(&JointVector::from_slice(&[true, false]).unwrap())
        .unwrap();

    controller.port_mut().set_joint_position(0, 0.2);
    controller.tick(DT);

    // Leaving torque mode later cannot cause a position jump.
    assert!((controller.desired_position()[0] - 0.2).abs() < 1e-12);
    assert_eq!(controller.desired_position()[1], 0.5);
}

#[test]
fn entering_torque_mode_zeroes_output_immediately() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller
        .set_desired_position(&JointVector::filled(2, 1.0))
        .unwrap();
    controller.tick(DT);
    assert!(controller.port().applied_torque()[0] > 10.0);

    // The mode switch itself must not leave the PID torque applied
    // until the next tick.
    controller
        .enable_torque_mode(&JointVector::filled(2, true))
        .unwrap();
    assert_eq!(controller.port().applied_torque().as_slice(), &[0.0, 0.0]);

    // Repeating the same mask is a no-op, not another write.
    controller.tick(DT);
    controller
        .set_desired_torque(&JointVector::from_slice(&[3.0, 0.0]).unwrap())
        .unwrap();
    controller.tick(DT);
    controller
        .enable_torque_mode(&JointVector::filled(2, true))
        .unwrap();
    assert_eq!(controller.port().applied_torque()[0], 3.0);
}

#[test]
fn enable_joints_mask_changes_are_reported_once() {
    let mut controller = build(&two_joint_toml(100.0));
    let mask = JointVector::from_slice(&[true, false]).unwrap();
    controller.enable_joints(&mask).unwrap();
    controller.enable_joints(&mask).unwrap();

    let reports = controller
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, ControllerEvent::EnabledJoints(_)))
        .count();
    assert_eq!(reports, 1);
}

#[test]
fn disabled_joint_produces_zero_torque() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller
        .set_desired_position(&JointVector::filled(2, 0.5))
        .unwrap();
    controller
        .enable_joints(&JointVector::from_slice(&[true, false]).unwrap())
        .unwrap();

    controller.tick(DT);

    let torque = controller.port().applied_torque();
    assert!(torque[0] > 0.0);
    assert_eq!(torque[1], 0.0);
}
