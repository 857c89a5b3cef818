//! Hardware feedback/command boundary.
//!
//! The controller consumes hardware exclusively through
//! [`RobotPort`], so simulation backends and real drivers can be
//! swapped without touching control logic.

use crate::joints::{JointType, JointVector};

/// Row-major actuator-to-joint coupling matrix.
///
/// The controller never interprets the coefficients; it forwards
/// the matrix to the port and to downstream listeners. A coupling
/// change invalidates any cached feedback interpretation, which is
/// why the controller resamples feedback on notification.
#[derive(Debug, Clone, PartialEq)]
pub struct CouplingMatrix {
    rows: usize,
    cols: usize,
    data: std::vec::Vec<f64>,
}

impl CouplingMatrix {
    /// Build from row-major data. `None` when the data length does
    /// not match `rows * cols`.
    pub fn new(rows: usize, cols: usize, data: std::vec::Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// N×N identity mapping (the uncoupled default).
    pub fn identity(n: usize) -> Self {
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            data[i * n + i] = 1.0;
        }
        Self {
            rows: n,
            cols: n,
            data,
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Coefficient at (`row`, `col`).
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }
}

/// Position feedback sample plus its acquisition timestamp [s].
#[derive(Debug, Clone, PartialEq)]
pub struct PositionFeedback {
    pub position: JointVector<f64>,
    pub timestamp: f64,
}

/// Abstract robot hardware interface consumed by the controller.
///
/// # Timing contract
///
/// All feedback reads return the most recent cached sample and must
/// not block; `set_torque` hands the command to the transport
/// without waiting for a round-trip. The tick calls into this trait
/// with bounded work only.
///
/// `joint_types` is queried exactly once, at startup; a mismatch
/// with the configured joint layout aborts startup.
pub trait RobotPort {
    /// Most recent joint position sample.
    fn feedback_position(&self) -> PositionFeedback;

    /// Most recent joint velocity sample, when the hardware provides
    /// one. Controllers fall back to finite-differencing the
    /// position error when this returns `None`.
    fn feedback_velocity(&self) -> Option<JointVector<f64>>;

    /// Most recent joint torque sample.
    fn feedback_torque(&self) -> JointVector<f64>;

    /// Command per-joint torques.
    fn set_torque(&mut self, torque: &JointVector<f64>);

    /// Hardware-reported joint types.
    fn joint_types(&self) -> JointVector<JointType>;

    /// Forward a new actuator/joint coupling matrix to the hardware.
    fn set_coupling(&mut self, coupling: &CouplingMatrix);
}
