//! Controller orchestration: feedback in, torque out, supervision in
//! between.
//!
//! [`PidController`] owns the port, the event sink, the config
//! store, and all per-joint runtime state. Its `tick` is the only
//! place feedback is sampled and torque is written during normal
//! operation; the enable path additionally writes a synchronous zero
//! torque so a disable never waits for the next tick.

use tracing::warn;

use manip_common::error::{CommandError, StartupError};
use manip_common::event::{ControllerEvent, EventSink};
use manip_common::joints::JointVector;
use manip_common::port::{CouplingMatrix, RobotPort};

use crate::control::{PidState, TickInput, compute_tick};
use crate::safety::{JointLimitDetector, TrackingDetector};
use crate::store::ConfigStore;

pub struct PidController<P: RobotPort, S: EventSink> {
    port: P,
    sink: S,
    store: ConfigStore,

    state: PidState,
    measured_position: JointVector<f64>,
    measured_velocity: JointVector<f64>,
    measured_torque: JointVector<f64>,
    desired_position: JointVector<f64>,
    desired_torque: JointVector<f64>,
    commanded_torque: JointVector<f64>,

    enabled: bool,
    joint_enabled: JointVector<bool>,
    torque_mode: JointVector<bool>,
    tracking_enabled: bool,

    limit_detector: JointLimitDetector,
    tracking_detector: TrackingDetector,
}

impl<P: RobotPort, S: EventSink> PidController<P, S> {
    /// Build a controller against `port`, validating that the
    /// hardware layout matches the configuration.
    ///
    /// Starts disabled, with the desired position taken from the
    /// current measured position so a later enable holds station.
    pub fn new(store: ConfigStore, port: P, sink: S) -> Result<Self, StartupError> {
        let n = store.joints();
        let reported = port.joint_types();
        if reported.len() != n {
            return Err(StartupError::JointCountMismatch {
                expected: n,
                actual: reported.len(),
            });
        }
        for (i, (&configured, &hw)) in
            store.joint_types().iter().zip(reported.iter()).enumerate()
        {
            if configured != hw {
                return Err(StartupError::JointTypeMismatch {
                    index: i,
                    name: store.names()[i].clone(),
                    configured,
                    reported: hw,
                });
            }
        }

        let measured_position = port.feedback_position().position;
        let desired_position = measured_position.clone();

        Ok(Self {
            port,
            sink,
            store,
            state: PidState::new(n),
            measured_position,
            measured_velocity: JointVector::filled(n, 0.0),
            measured_torque: JointVector::filled(n, 0.0),
            desired_position,
            desired_torque: JointVector::filled(n, 0.0),
            commanded_torque: JointVector::filled(n, 0.0),
            enabled: false,
            joint_enabled: JointVector::filled(n, true),
            torque_mode: JointVector::filled(n, false),
            tracking_enabled: false,
            limit_detector: JointLimitDetector::new(n),
            tracking_detector: TrackingDetector::new(n),
        })
    }

    // ─── Periodic Tick ──────────────────────────────────────────────

    /// Run one control tick with period `dt` [s].
    pub fn tick(&mut self, dt: f64) {
        let feedback = self.port.feedback_position();
        self.measured_position.copy_from(&feedback.position);
        self.measured_torque.copy_from(&self.port.feedback_torque());

        let velocity = if self.store.velocity_feedback() {
            match self.port.feedback_velocity() {
                Some(v) => {
                    self.measured_velocity.copy_from(&v);
                    Some(&self.measured_velocity)
                }
                None => None,
            }
        } else {
            None
        };

        // One snapshot per tick; setters publishing mid-tick become
        // visible at the next boundary.
        let gains = self.store.load();

        let input = TickInput {
            measured_position: &self.measured_position,
            measured_velocity: velocity,
            desired_torque: &self.desired_torque,
            joint_enabled: &self.joint_enabled,
            torque_mode: &self.torque_mode,
            enabled: self.enabled,
            dt,
        };
        compute_tick(
            &mut self.state,
            &gains,
            &input,
            &mut self.desired_position,
            &mut self.commanded_torque,
        );

        if self.enabled && self.tracking_enabled {
            let outcome = self.tracking_detector.evaluate(
                &self.state.error,
                &gains.tracking_tolerance,
                &self.joint_enabled,
                self.limit_detector.flags(),
            );
            if let Some(bitmap) = outcome.changed {
                if bitmap.any() {
                    self.sink.notify(ControllerEvent::Error(format!(
                        "tracking error exceeded tolerance, joints {:?}",
                        bitmap.as_slice()
                    )));
                }
            }
            if outcome.tripped {
                // Protective action, applied every tick the
                // condition holds.
                self.set_enabled(false);
                self.commanded_torque.fill(0.0);
            }
        }

        self.port.set_torque(&self.commanded_torque);
    }

    // ─── Enable State Machine ───────────────────────────────────────

    /// Change the global enable state. Idempotent; a real transition
    /// zeroes the torque command and writes it to the port
    /// immediately, without waiting for the next tick.
    pub fn enable(&mut self, on: bool) {
        if on == self.enabled {
            return;
        }
        self.set_enabled(on);
    }

    fn set_enabled(&mut self, on: bool) {
        self.enabled = on;
        self.commanded_torque.fill(0.0);
        self.port.set_torque(&self.commanded_torque);
        if on {
            self.limit_detector.reset();
            self.tracking_detector.reset();
        }
        self.sink.notify(ControllerEvent::Enabled(on));
    }

    /// Report a hardware fault from the port owner.
    ///
    /// Forces a disable when running; when already disabled only a
    /// status message is emitted.
    pub fn hardware_error(&mut self, message: &str) {
        if self.enabled {
            self.set_enabled(false);
            self.sink.notify(ControllerEvent::Error(format!(
                "hardware error, controller disabled: {message}"
            )));
        } else {
            self.sink.notify(ControllerEvent::Status(format!(
                "hardware error while disabled: {message}"
            )));
        }
    }

    /// Zero all accumulated control state, re-derive the desired
    /// position from a fresh measurement, and disable.
    pub fn reset_controller(&mut self) {
        self.state.reset();
        self.desired_position
            .copy_from(&self.port.feedback_position().position);
        self.desired_torque.fill(0.0);
        if self.enabled {
            self.set_enabled(false);
        }
    }

    // ─── Command Surface ────────────────────────────────────────────

    /// Replace the per-joint enable mask.
    pub fn enable_joints(&mut self, mask: &JointVector<bool>) -> Result<(), CommandError> {
        self.check_len("enable_joints", mask.len())?;
        if *mask != self.joint_enabled {
            self.joint_enabled.copy_from(mask);
            self.sink
                .notify(ControllerEvent::EnabledJoints(mask.clone()));
        }
        Ok(())
    }

    /// Replace the per-joint torque-mode mask.
    ///
    /// A mask change zeroes the torque command and writes it to the
    /// port synchronously; the previous tick's PID torque must not
    /// stay applied across the mode switch.
    pub fn enable_torque_mode(&mut self, mask: &JointVector<bool>) -> Result<(), CommandError> {
        self.check_len("enable_torque_mode", mask.len())?;
        if *mask != self.torque_mode {
            self.torque_mode.copy_from(mask);
            self.commanded_torque.fill(0.0);
            self.port.set_torque(&self.commanded_torque);
        }
        Ok(())
    }

    /// Arm or disarm the tracking-error trip. Starts disarmed;
    /// arming clears the detector so supervision begins with a clean
    /// fault history.
    pub fn enable_tracking_error(&mut self, on: bool) {
        if on != self.tracking_enabled {
            self.tracking_enabled = on;
            self.tracking_detector.reset();
        }
    }

    /// Command a new desired position, clamped into the configured
    /// joint limits.
    pub fn set_desired_position(
        &mut self,
        desired: &JointVector<f64>,
    ) -> Result<(), CommandError> {
        self.check_len("set_desired_position", desired.len())?;
        self.desired_position.copy_from(desired);
        let gains = self.store.load();
        if let Some(bitmap) = self
            .limit_detector
            .clamp_command(&gains, &mut self.desired_position)
        {
            if bitmap.any() {
                self.sink.notify(ControllerEvent::Warning(format!(
                    "desired position clamped to joint limits, joints {:?}",
                    bitmap.as_slice()
                )));
            }
            self.sink.notify(ControllerEvent::JointLimit(bitmap));
        }
        Ok(())
    }

    /// Command desired torques for joints in torque mode.
    pub fn set_desired_torque(
        &mut self,
        desired: &JointVector<f64>,
    ) -> Result<(), CommandError> {
        self.check_len("set_desired_torque", desired.len())?;
        self.desired_torque.copy_from(desired);
        Ok(())
    }

    /// Forward a new coupling matrix to the hardware.
    pub fn set_coupling(&mut self, coupling: &CouplingMatrix) {
        self.port.set_coupling(coupling);
    }

    /// Notification that the actuator/joint coupling changed.
    ///
    /// Cached feedback was sampled under the old mapping, so
    /// position and torque are resampled immediately before the
    /// change is announced.
    pub fn coupling_changed(&mut self, coupling: CouplingMatrix) {
        self.measured_position
            .copy_from(&self.port.feedback_position().position);
        self.measured_torque.copy_from(&self.port.feedback_torque());
        self.sink.notify(ControllerEvent::Coupling(coupling));
    }

    fn check_len(&self, command: &'static str, actual: usize) -> Result<(), CommandError> {
        let expected = self.store.joints();
        if actual != expected {
            let err = CommandError::SizeMismatch {
                command,
                expected,
                actual,
            };
            warn!("{err}");
            return Err(err);
        }
        Ok(())
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn tracking_error_enabled(&self) -> bool {
        self.tracking_enabled
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn desired_position(&self) -> &JointVector<f64> {
        &self.desired_position
    }

    pub fn measured_position(&self) -> &JointVector<f64> {
        &self.measured_position
    }

    pub fn commanded_torque(&self) -> &JointVector<f64> {
        &self.commanded_torque
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
