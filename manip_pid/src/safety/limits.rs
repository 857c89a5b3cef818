//! Joint position-limit clamping on commanded setpoints.

use manip_common::joints::JointVector;

use crate::store::GainSnapshot;

/// Clamps desired positions into the configured software limits.
///
/// Runs when a new desired position is commanded, not every tick.
/// The current bitmap marks joints sitting at a limit; the previous
/// bitmap exists only to detect changes worth reporting.
#[derive(Debug)]
pub struct JointLimitDetector {
    flag: JointVector<bool>,
    prev_flag: JointVector<bool>,
}

impl JointLimitDetector {
    pub fn new(joints: usize) -> Self {
        Self {
            flag: JointVector::filled(joints, false),
            prev_flag: JointVector::filled(joints, false),
        }
    }

    /// Clamp `desired` in place against the snapshot's limits.
    ///
    /// Returns the new bitmap when it differs from the previous
    /// evaluation, `None` otherwise. Does nothing when limit
    /// checking is configured off.
    pub fn clamp_command(
        &mut self,
        gains: &GainSnapshot,
        desired: &mut JointVector<f64>,
    ) -> Option<JointVector<bool>> {
        if !gains.check_joint_limit {
            return None;
        }
        for j in 0..desired.len() {
            let lower = gains.lower_limit[j];
            let upper = gains.upper_limit[j];
            if desired[j] < lower {
                desired[j] = lower;
                self.flag[j] = true;
            } else if desired[j] > upper {
                desired[j] = upper;
                self.flag[j] = true;
            } else {
                self.flag[j] = false;
            }
        }
        if self.flag != self.prev_flag {
            self.prev_flag.copy_from(&self.flag);
            Some(self.flag.clone())
        } else {
            None
        }
    }

    /// Joints currently held at a limit. Used to exempt clamped
    /// joints from the tracking-error trip.
    pub fn flags(&self) -> &JointVector<bool> {
        &self.flag
    }

    /// Clear flags and shadows, on transition into Enabled.
    pub fn reset(&mut self) {
        self.flag.fill(false);
        self.prev_flag.fill(false);
    }
}
