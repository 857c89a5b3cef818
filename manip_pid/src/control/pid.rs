//! The PID torque pipeline, run once per tick.
//!
//! [`compute_tick`] is deterministic and bounded: no I/O, no
//! allocation, no locking. Everything it needs arrives as arguments;
//! everything it produces lands in `state`, `desired_position`, and
//! `torque`. Feedback sampling and torque output stay with the
//! caller.

use manip_common::joints::JointVector;

use crate::store::GainSnapshot;

// ─── State ──────────────────────────────────────────────────────────

/// Per-joint control state carried across ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct PidState {
    /// Deadband-filtered tracking error of the current tick.
    pub error: JointVector<f64>,
    /// Error of the previous tick, for finite-difference derivative.
    pub prev_error: JointVector<f64>,
    /// Derivative term input of the current tick.
    pub derivative_error: JointVector<f64>,
    /// Accumulated (forgetting, clamped) integral.
    pub integral_error: JointVector<f64>,
}

impl PidState {
    pub fn new(joints: usize) -> Self {
        Self {
            error: JointVector::filled(joints, 0.0),
            prev_error: JointVector::filled(joints, 0.0),
            derivative_error: JointVector::filled(joints, 0.0),
            integral_error: JointVector::filled(joints, 0.0),
        }
    }

    /// Zero all accumulated state.
    pub fn reset(&mut self) {
        self.error.fill(0.0);
        self.prev_error.fill(0.0);
        self.derivative_error.fill(0.0);
        self.integral_error.fill(0.0);
    }
}

// ─── Tick Input ─────────────────────────────────────────────────────

/// Everything the pipeline reads for one tick, borrowed from the
/// controller.
pub struct TickInput<'a> {
    pub measured_position: &'a JointVector<f64>,
    /// Hardware velocity feedback, if the port provides it and the
    /// configuration selects it.
    pub measured_velocity: Option<&'a JointVector<f64>>,
    pub desired_torque: &'a JointVector<f64>,
    pub joint_enabled: &'a JointVector<bool>,
    pub torque_mode: &'a JointVector<bool>,
    /// Global enable flag. The pipeline always runs in full; when
    /// false only the final output is forced to zero, so the
    /// integral keeps accumulating inside its clamp.
    pub enabled: bool,
    /// Tick period [s].
    pub dt: f64,
}

// ─── Pipeline ───────────────────────────────────────────────────────

/// Run the torque pipeline for one tick.
///
/// `desired_position` is in/out: joints in torque mode have their
/// desired position snapped to the measured position so leaving
/// torque mode cannot produce a position jump.
pub fn compute_tick(
    state: &mut PidState,
    gains: &GainSnapshot,
    input: &TickInput<'_>,
    desired_position: &mut JointVector<f64>,
    torque: &mut JointVector<f64>,
) {
    let n = state.error.len();

    for j in 0..n {
        // Tracking error with deadband.
        let mut error = desired_position[j] - input.measured_position[j];
        if error.abs() <= gains.deadband[j] {
            error = 0.0;
        }
        state.error[j] = error;

        // Derivative term. Desired velocity is held at zero, so
        // hardware velocity enters negated; otherwise fall back to a
        // finite difference of the error.
        state.derivative_error[j] = match input.measured_velocity {
            Some(velocity) => -velocity[j],
            None if input.dt > 0.0 => (error - state.prev_error[j]) / input.dt,
            None => 0.0,
        };

        // Forgetting integral with anti-windup clamp. Runs every
        // tick, enabled or not. Manual clamp: runtime setters can
        // leave min above max and that must saturate, not panic.
        let mut integral = state.integral_error[j] * gains.forget[j] + error;
        if integral > gains.max_integral[j] {
            integral = gains.max_integral[j];
        } else if integral < gains.min_integral[j] {
            integral = gains.min_integral[j];
        }
        state.integral_error[j] = integral;

        let mut out = gains.kp[j] * error
            + gains.kd[j] * state.derivative_error[j]
            + gains.ki[j] * integral;

        // Nonlinear gain shaping near the setpoint.
        if gains.nonlinear[j] > 0.0 && error.abs() < gains.nonlinear[j] {
            out *= error.abs() / gains.nonlinear[j];
        }

        if !input.joint_enabled[j] {
            out = 0.0;
        }

        // Offset applies even to disabled joints (gravity
        // compensation style bias).
        out += gains.offset[j];

        if input.torque_mode[j] {
            out = input.desired_torque[j];
            desired_position[j] = input.measured_position[j];
        }

        torque[j] = out;
        state.prev_error[j] = error;
    }

    if !input.enabled {
        torque.fill(0.0);
    }
}
