//! Periodic joint-space PID torque controller.
//!
//! The controller turns measured joint positions, velocities, and
//! torques plus a desired-position command into a per-joint torque
//! command once per tick. Safety behavior (joint-limit clamping,
//! tracking-error trip, anti-windup, fail-safe disable) is part of
//! the tick, not bolted on outside it.
//!
//! Module map:
//!
//! - [`store`] — gain/limit configuration with atomic snapshot
//!   publication, so reconfiguration never tears a tick
//! - [`control`] — the pure per-tick PID pipeline
//! - [`safety`] — edge-triggered joint-limit and tracking-error
//!   detectors
//! - [`controller`] — the orchestrator tying feedback, pipeline,
//!   detectors, and the command surface together
//! - [`sim`] — mass-damper simulated robot port for the demo binary
//!   and integration tests
//! - [`stats`] — cycle timing bookkeeping for the demo loop

pub mod control;
pub mod controller;
pub mod safety;
pub mod sim;
pub mod stats;
pub mod store;
