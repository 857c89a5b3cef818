//! Joint-limit clamping on commanded setpoints.

use manip_common::event::ControllerEvent;
use manip_common::joints::JointVector;

use super::{build, two_joint_toml};

fn limit_events(events: &[ControllerEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ControllerEvent::JointLimit(_)))
        .count()
}

#[test]
fn out_of_range_setpoint_is_clamped_and_reported_once() {
    let mut controller = build(&two_joint_toml(100.0));
    let limit = 90.0_f64.to_radians();

    let setpoint = JointVector::from_slice(&[2.0, 0.5]).unwrap();
    controller.set_desired_position(&setpoint).unwrap();
    assert!((controller.desired_position()[0] - limit).abs() < 1e-12);
    assert_eq!(controller.desired_position()[1], 0.5);
    assert_eq!(limit_events(&controller.sink().events), 1);
    assert!(
        controller
            .sink()
            .events
            .iter()
            .any(|e| matches!(e, ControllerEvent::Warning(_)))
    );

    // Same violation again: clamped again, no second report.
    let setpoint = JointVector::from_slice(&[3.0, 0.5]).unwrap();
    controller.set_desired_position(&setpoint).unwrap();
    assert!((controller.desired_position()[0] - limit).abs() < 1e-12);
    assert_eq!(limit_events(&controller.sink().events), 1);
}

#[test]
fn returning_in_range_reports_the_clear_edge() {
    let mut controller = build(&two_joint_toml(100.0));
    controller
        .set_desired_position(&JointVector::from_slice(&[2.0, 0.0]).unwrap())
        .unwrap();
    controller
        .set_desired_position(&JointVector::from_slice(&[0.0, 0.0]).unwrap())
        .unwrap();
    // Every bitmap change is announced, the clear edge included, so
    // listeners can retire a standing limit warning without polling.
    // Only the set edge carries a Warning message.
    assert_eq!(limit_events(&controller.sink().events), 2);
    let last = controller
        .sink()
        .events
        .iter()
        .rev()
        .find_map(|e| match e {
            ControllerEvent::JointLimit(bitmap) => Some(bitmap.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(last.as_slice(), &[false, false]);
}

#[test]
fn limit_checking_can_be_toggled_at_runtime() {
    let mut controller = build(&two_joint_toml(100.0));
    controller.store().set_check_joint_limit(false);

    let setpoint = JointVector::from_slice(&[2.0, 0.0]).unwrap();
    controller.set_desired_position(&setpoint).unwrap();
    assert_eq!(controller.desired_position()[0], 2.0);
    assert_eq!(limit_events(&controller.sink().events), 0);

    controller.store().set_check_joint_limit(true);
    controller.set_desired_position(&setpoint).unwrap();
    assert!((controller.desired_position()[0] - 90.0_f64.to_radians()).abs() < 1e-12);
    assert_eq!(limit_events(&controller.sink().events), 1);
}

#[test]
fn missing_limit_block_disables_clamping_entirely() {
    // Strip the second joint's position-limit block; checking turns
    // off for the whole controller.
    let toml = two_joint_toml(100.0);
    let idx = toml.rfind("[joints.position_limit]").unwrap();
    let toml = toml[..idx].to_string();

    let mut controller = build(&toml);
    let setpoint = JointVector::from_slice(&[100.0, -100.0]).unwrap();
    controller.set_desired_position(&setpoint).unwrap();
    assert_eq!(controller.desired_position().as_slice(), &[100.0, -100.0]);
    assert_eq!(limit_events(&controller.sink().events), 0);
}
