//! Tracking-error trip and hardware fault handling.

use manip_common::event::ControllerEvent;
use manip_common::joints::JointVector;

use super::{DT, build, two_joint_toml};

fn error_count(events: &[ControllerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ControllerEvent::Error(_)))
        .count()
}

#[test]
fn tracking_supervision_starts_disarmed() {
    let mut controller = build(&two_joint_toml(2.0));
    controller.enable(true);
    assert!(!controller.tracking_error_enabled());

    // Error well over tolerance, but nothing trips until the check
    // is armed.
    controller.port_mut().set_joint_position(0, 5.0);
    controller.tick(DT);
    assert!(controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 0);

    controller.enable_tracking_error(true);
    controller.tick(DT);
    assert!(!controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 1);
}

#[test]
fn tracking_trip_disables_and_reports_once() {
    let mut controller = build(&two_joint_toml(2.0));
    controller.enable(true);
    controller.enable_tracking_error(true);

    // Teleport one joint far from the (station-keeping) setpoint.
    controller.port_mut().set_joint_position(0, 5.0);
    controller.tick(DT);

    assert!(!controller.is_enabled());
    assert_eq!(controller.port().applied_torque().as_slice(), &[0.0, 0.0]);
    assert_eq!(error_count(&controller.sink().events), 1);
    assert!(
        controller
            .sink()
            .events
            .contains(&ControllerEvent::Enabled(false))
    );

    // Condition persists but the controller is disabled now; no
    // repeat reports, output stays zero.
    for _ in 0..10 {
        controller.tick(DT);
    }
    assert_eq!(error_count(&controller.sink().events), 1);
    assert_eq!(controller.port().applied_torque().as_slice(), &[0.0, 0.0]);
}

#[test]
fn reenable_resets_detectors_and_trips_again() {
    let mut controller = build(&two_joint_toml(2.0));
    controller.enable(true);
    controller.enable_tracking_error(true);
    controller.port_mut().set_joint_position(0, 5.0);
    controller.tick(DT);
    assert_eq!(error_count(&controller.sink().events), 1);

    // Error still over tolerance; a fresh enable must trip anew.
    controller.enable(true);
    controller.tick(DT);
    assert!(!controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 2);
}

#[test]
fn generous_tolerance_never_trips() {
    // Default tolerance of 100 rad is effectively no supervision
    // even with the check armed.
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller.enable_tracking_error(true);
    controller.port_mut().set_joint_position(0, 5.0);
    for _ in 0..10 {
        controller.tick(DT);
        controller.port_mut().step(DT);
    }
    assert!(controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 0);
}

#[test]
fn disabled_joints_do_not_trip() {
    let mut controller = build(&two_joint_toml(2.0));
    controller.enable(true);
    controller.enable_tracking_error(true);
    controller
        .enable_joints(&JointVector::from_slice(&[false, true]).unwrap())
        .unwrap();
    controller.port_mut().set_joint_position(0, 5.0);
    controller.tick(DT);
    assert!(controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 0);
}

#[test]
fn hardware_error_while_enabled_forces_disable() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.enable(true);
    controller.hardware_error("encoder glitch");
    assert!(!controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 1);
    assert_eq!(controller.port().applied_torque().as_slice(), &[0.0, 0.0]);
}

#[test]
fn hardware_error_while_disabled_is_status_only() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.hardware_error("encoder glitch");
    assert!(!controller.is_enabled());
    assert_eq!(error_count(&controller.sink().events), 0);
    assert!(
        controller
            .sink()
            .events
            .iter()
            .any(|e| matches!(e, ControllerEvent::Status(_)))
    );
}
