//! Tracking-error trip, evaluated every tick.

use manip_common::joints::JointVector;

/// Result of one tracking evaluation.
#[derive(Debug)]
pub struct TrackingOutcome {
    /// At least one joint is over tolerance; the caller must apply
    /// the protective disable. Level-triggered.
    pub tripped: bool,
    /// New bitmap when it differs from the previous tick, for
    /// one-shot reporting. Edge-triggered.
    pub changed: Option<JointVector<bool>>,
}

/// Per-joint tracking-error supervision.
#[derive(Debug)]
pub struct TrackingDetector {
    flag: JointVector<bool>,
    prev_flag: JointVector<bool>,
}

impl TrackingDetector {
    pub fn new(joints: usize) -> Self {
        Self {
            flag: JointVector::filled(joints, false),
            prev_flag: JointVector::filled(joints, false),
        }
    }

    /// Evaluate one tick of tracking errors.
    ///
    /// Disabled joints and joints currently held at a position limit
    /// are exempt: a clamped setpoint can sit legitimately far from
    /// a pushed-against-the-stop measured position.
    pub fn evaluate(
        &mut self,
        error: &JointVector<f64>,
        tolerance: &JointVector<f64>,
        joint_enabled: &JointVector<bool>,
        at_limit: &JointVector<bool>,
    ) -> TrackingOutcome {
        for j in 0..error.len() {
            self.flag[j] =
                joint_enabled[j] && !at_limit[j] && error[j].abs() > tolerance[j];
        }
        let changed = if self.flag != self.prev_flag {
            self.prev_flag.copy_from(&self.flag);
            Some(self.flag.clone())
        } else {
            None
        };
        TrackingOutcome {
            tripped: self.flag.any(),
            changed,
        }
    }

    /// Clear flags and shadows, on transition into Enabled.
    pub fn reset(&mut self) {
        self.flag.fill(false);
        self.prev_flag.fill(false);
    }
}
