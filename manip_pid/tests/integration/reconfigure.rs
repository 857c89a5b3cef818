//! Runtime gain reconfiguration and command rejection.

use manip_common::error::CommandError;
use manip_common::joints::JointVector;

use super::{DT, build, two_joint_toml};

#[test]
fn gain_change_takes_effect_on_the_next_tick() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller
        .set_desired_position(&JointVector::filled(2, 1.0))
        .unwrap();

    controller.tick(DT);
    let before = controller.port().applied_torque()[0];

    // Double kp, drop ki so the integral does not muddy the compare.
    controller
        .store()
        .set_i_gain(&JointVector::filled(2, 0.0))
        .unwrap();
    controller
        .store()
        .set_p_gain(&JointVector::filled(2, 20.0))
        .unwrap();

    controller.tick(DT);
    let after = controller.port().applied_torque()[0];
    // Plant has not moved (no step), error unchanged at 1 rad:
    // kp went 10 → 20 and the 0.1-weighted integral dropped out.
    assert!((before - 10.1).abs() < 1e-9);
    assert!((after - 20.0).abs() < 1e-9);
}

#[test]
fn wrong_length_commands_are_rejected_everywhere() {
    let mut controller = build(&two_joint_toml(100.0));
    let three = JointVector::filled(3, 0.0);
    let three_mask = JointVector::filled(3, true);

    assert!(matches!(
        controller.set_desired_position(&three),
        Err(CommandError::SizeMismatch {
            command: "set_desired_position",
            expected: 2,
            actual: 3
        })
    ));
    assert!(controller.set_desired_torque(&three).is_err());
    assert!(controller.enable_joints(&three_mask).is_err());
    assert!(controller.enable_torque_mode(&three_mask).is_err());
    assert!(controller.store().set_p_gain(&three).is_err());
    assert!(controller.store().set_tracking_tolerance(&three).is_err());

    // Nothing changed and the controller still ticks normally.
    assert_eq!(controller.desired_position().as_slice(), &[0.0, 0.0]);
    assert_eq!(controller.store().p_gain().as_slice(), &[10.0, 10.0]);
    controller.enable(true);
    controller.tick(DT);
}

#[test]
fn tolerance_tightened_at_runtime_is_honored() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller.enable_tracking_error(true);
    controller.port_mut().set_joint_position(0, 5.0);
    controller.tick(DT);
    assert!(controller.is_enabled());

    controller
        .store()
        .set_tracking_tolerance(&JointVector::filled(2, 2.0))
        .unwrap();
    controller.tick(DT);
    assert!(!controller.is_enabled());
}
