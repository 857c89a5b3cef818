//! Coupling matrix forwarding and change notification.

use manip_common::event::ControllerEvent;
use manip_common::port::CouplingMatrix;

use super::{build, two_joint_toml};

#[test]
fn set_coupling_forwards_to_the_port() {
    let mut controller = build(&two_joint_toml(100.0));
    let matrix = CouplingMatrix::new(2, 2, vec![1.0, 0.5, 0.0, 1.0]).unwrap();
    controller.set_coupling(&matrix);
    assert_eq!(controller.port().coupling(), &matrix);
}

#[test]
fn coupling_change_resamples_feedback_and_notifies() {
    let mut controller = build(&two_joint_toml(100.0));
    assert_eq!(controller.measured_position()[0], 0.0);

    // Move the plant behind the controller's back; the cached sample
    // is stale until the coupling notification forces a resample.
    controller.port_mut().set_joint_position(0, 0.8);
    controller.coupling_changed(CouplingMatrix::identity(2));

    assert!((controller.measured_position()[0] - 0.8).abs() < 1e-12);
    let announced = controller
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, ControllerEvent::Coupling(_)));
    assert!(announced);
}
