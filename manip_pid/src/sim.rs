//! Simulated robot port: a per-joint mass-damper plant.
//!
//! Used by the demo binary and the integration tests. Each joint
//! integrates `accel = torque / inertia - damping * velocity` with
//! semi-implicit Euler, which is plenty for closed-loop sanity
//! checks.

use manip_common::joints::{JointType, JointVector};
use manip_common::port::{CouplingMatrix, PositionFeedback, RobotPort};

pub struct SimRobot {
    joint_types: JointVector<JointType>,
    position: JointVector<f64>,
    velocity: JointVector<f64>,
    applied_torque: JointVector<f64>,
    inertia: JointVector<f64>,
    damping: JointVector<f64>,
    /// When false the port reports no velocity feedback, forcing the
    /// controller onto finite differencing.
    velocity_feedback: bool,
    time: f64,
    coupling: CouplingMatrix,
}

impl SimRobot {
    pub fn new(joint_types: &JointVector<JointType>) -> Self {
        let n = joint_types.len();
        Self {
            joint_types: joint_types.clone(),
            position: JointVector::filled(n, 0.0),
            velocity: JointVector::filled(n, 0.0),
            applied_torque: JointVector::filled(n, 0.0),
            inertia: JointVector::filled(n, 1.0),
            damping: JointVector::filled(n, 2.0),
            velocity_feedback: true,
            time: 0.0,
            coupling: CouplingMatrix::identity(n),
        }
    }

    pub fn with_velocity_feedback(mut self, on: bool) -> Self {
        self.velocity_feedback = on;
        self
    }

    /// Advance the plant by `dt` [s] under the last applied torque.
    pub fn step(&mut self, dt: f64) {
        for j in 0..self.position.len() {
            let accel = self.applied_torque[j] / self.inertia[j]
                - self.damping[j] * self.velocity[j];
            self.velocity[j] += accel * dt;
            self.position[j] += self.velocity[j] * dt;
        }
        self.time += dt;
    }

    /// Teleport a joint, for test setup.
    pub fn set_joint_position(&mut self, joint: usize, position: f64) {
        self.position[joint] = position;
        self.velocity[joint] = 0.0;
    }

    /// Torque most recently commanded by the controller.
    pub fn applied_torque(&self) -> &JointVector<f64> {
        &self.applied_torque
    }

    pub fn coupling(&self) -> &CouplingMatrix {
        &self.coupling
    }
}

impl RobotPort for SimRobot {
    fn feedback_position(&self) -> PositionFeedback {
        PositionFeedback {
            position: self.position.clone(),
            timestamp: self.time,
        }
    }

    fn feedback_velocity(&self) -> Option<JointVector<f64>> {
        self.velocity_feedback.then(|| self.velocity.clone())
    }

    fn feedback_torque(&self) -> JointVector<f64> {
        self.applied_torque.clone()
    }

    fn set_torque(&mut self, torque: &JointVector<f64>) {
        self.applied_torque.copy_from(torque);
    }

    fn joint_types(&self) -> JointVector<JointType> {
        self.joint_types.clone()
    }

    fn set_coupling(&mut self, coupling: &CouplingMatrix) {
        self.coupling = coupling.clone();
    }
}
