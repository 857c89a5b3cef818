//! Gain/limit configuration store with atomic snapshot publication.
//!
//! All tunable per-joint parameters live in an immutable
//! [`GainSnapshot`] behind an `Arc`. Setters build a complete new
//! snapshot and swap the `Arc` under a short `parking_lot` lock; the
//! control tick clones the `Arc` once at the tick boundary and works
//! from that clone for the rest of the tick. A reconfiguration is
//! therefore visible only at the next tick boundary, never mid-tick.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use manip_common::config::ControllerConfig;
use manip_common::error::CommandError;
use manip_common::joints::{JointType, JointVector};

// ─── Snapshot ───────────────────────────────────────────────────────

/// One immutable generation of all tunable parameters.
///
/// Every vector has length N (the configured joint count). Published
/// snapshots are never mutated; reconfiguration replaces the whole
/// snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GainSnapshot {
    pub kp: JointVector<f64>,
    pub kd: JointVector<f64>,
    pub ki: JointVector<f64>,
    pub offset: JointVector<f64>,
    pub forget: JointVector<f64>,
    pub nonlinear: JointVector<f64>,
    pub deadband: JointVector<f64>,
    pub min_integral: JointVector<f64>,
    pub max_integral: JointVector<f64>,
    pub tracking_tolerance: JointVector<f64>,
    pub lower_limit: JointVector<f64>,
    pub upper_limit: JointVector<f64>,
    /// Joint-limit clamping applies only when set. Forced off at
    /// load time when any joint entry omits its position-limit
    /// block.
    pub check_joint_limit: bool,
}

// ─── Store ──────────────────────────────────────────────────────────

/// Owns the current [`GainSnapshot`] plus the immutable joint layout.
#[derive(Debug)]
pub struct ConfigStore {
    joints: usize,
    names: Vec<String>,
    joint_types: JointVector<JointType>,
    velocity_feedback: bool,
    snapshot: Mutex<Arc<GainSnapshot>>,
}

impl ConfigStore {
    /// Build the store from a validated, unit-normalized
    /// configuration.
    pub fn from_config(config: &ControllerConfig) -> Self {
        let n = config.joints.len();
        let mut snapshot = GainSnapshot {
            kp: JointVector::filled(n, 0.0),
            kd: JointVector::filled(n, 0.0),
            ki: JointVector::filled(n, 0.0),
            offset: JointVector::filled(n, 0.0),
            forget: JointVector::filled(n, 1.0),
            nonlinear: JointVector::filled(n, 0.0),
            deadband: JointVector::filled(n, 0.0),
            min_integral: JointVector::filled(n, 0.0),
            max_integral: JointVector::filled(n, 0.0),
            tracking_tolerance: JointVector::filled(n, 0.0),
            lower_limit: JointVector::filled(n, f64::NEG_INFINITY),
            upper_limit: JointVector::filled(n, f64::INFINITY),
            check_joint_limit: true,
        };

        let mut names = Vec::with_capacity(n);
        let mut joint_types = JointVector::filled(n, JointType::Revolute);

        for (i, joint) in config.joints.iter().enumerate() {
            names.push(joint.name.clone());
            joint_types[i] = joint.joint_type;
            snapshot.kp[i] = joint.pid.p_gain;
            snapshot.kd[i] = joint.pid.d_gain;
            snapshot.ki[i] = joint.pid.i_gain;
            snapshot.offset[i] = joint.pid.offset;
            snapshot.forget[i] = joint.pid.forget;
            snapshot.nonlinear[i] = joint.pid.nonlinear;
            snapshot.deadband[i] = joint.limit.deadband;
            snapshot.min_integral[i] = joint.limit.min_integral;
            snapshot.max_integral[i] = joint.limit.max_integral;
            snapshot.tracking_tolerance[i] = joint.limit.tracking_tolerance;
            match &joint.position_limit {
                Some(limit) => {
                    snapshot.lower_limit[i] = limit.lower;
                    snapshot.upper_limit[i] = limit.upper;
                }
                // One joint without limits turns checking off for
                // the whole controller; its limits stay infinite so
                // a clamp would be a no-op anyway.
                None => snapshot.check_joint_limit = false,
            }
        }

        Self {
            joints: n,
            names,
            joint_types,
            velocity_feedback: config.controller.velocity_feedback,
            snapshot: Mutex::new(Arc::new(snapshot)),
        }
    }

    /// Configured joint count.
    #[inline]
    pub fn joints(&self) -> usize {
        self.joints
    }

    /// Configured joint names, index-aligned.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Configured joint types, index-aligned.
    pub fn joint_types(&self) -> &JointVector<JointType> {
        &self.joint_types
    }

    /// Whether hardware velocity feedback drives the derivative
    /// term.
    #[inline]
    pub fn velocity_feedback(&self) -> bool {
        self.velocity_feedback
    }

    /// Grab the current snapshot. Called once per tick boundary; the
    /// lock is held only for the `Arc` clone.
    pub fn load(&self) -> Arc<GainSnapshot> {
        Arc::clone(&self.snapshot.lock())
    }

    /// Copy-on-write update of one parameter vector. Rejected with
    /// unchanged state when the length does not match.
    fn replace(
        &self,
        command: &'static str,
        values: &JointVector<f64>,
        select: impl FnOnce(&mut GainSnapshot) -> &mut JointVector<f64>,
    ) -> Result<(), CommandError> {
        if values.len() != self.joints {
            let err = CommandError::SizeMismatch {
                command,
                expected: self.joints,
                actual: values.len(),
            };
            warn!("{err}");
            return Err(err);
        }
        let mut cell = self.snapshot.lock();
        let mut next = GainSnapshot::clone(&cell);
        select(&mut next).copy_from(values);
        *cell = Arc::new(next);
        Ok(())
    }

    pub fn set_p_gain(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_p_gain", values, |s| &mut s.kp)
    }

    pub fn set_d_gain(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_d_gain", values, |s| &mut s.kd)
    }

    pub fn set_i_gain(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_i_gain", values, |s| &mut s.ki)
    }

    pub fn set_offset(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_offset", values, |s| &mut s.offset)
    }

    pub fn set_forget_factor(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_forget_factor", values, |s| &mut s.forget)
    }

    pub fn set_joint_lower_limit(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_joint_lower_limit", values, |s| &mut s.lower_limit)
    }

    pub fn set_joint_upper_limit(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_joint_upper_limit", values, |s| &mut s.upper_limit)
    }

    pub fn set_min_integral_limit(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_min_integral_limit", values, |s| &mut s.min_integral)
    }

    pub fn set_max_integral_limit(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_max_integral_limit", values, |s| &mut s.max_integral)
    }

    pub fn set_tracking_tolerance(&self, values: &JointVector<f64>) -> Result<(), CommandError> {
        self.replace("set_tracking_tolerance", values, |s| &mut s.tracking_tolerance)
    }

    /// Turn joint-limit checking on or off at runtime.
    ///
    /// Joints configured without limits keep their infinite bounds,
    /// so turning checking back on makes their clamp a no-op.
    pub fn set_check_joint_limit(&self, on: bool) {
        let mut cell = self.snapshot.lock();
        if cell.check_joint_limit != on {
            let mut next = GainSnapshot::clone(&cell);
            next.check_joint_limit = on;
            *cell = Arc::new(next);
        }
    }

    /// Current proportional gains.
    pub fn p_gain(&self) -> JointVector<f64> {
        self.load().kp.clone()
    }

    /// Current derivative gains.
    pub fn d_gain(&self) -> JointVector<f64> {
        self.load().kd.clone()
    }

    /// Current integral gains.
    pub fn i_gain(&self) -> JointVector<f64> {
        self.load().ki.clone()
    }
}
