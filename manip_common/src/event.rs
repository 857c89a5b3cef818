//! Controller events and the notification boundary.
//!
//! Fault handling happens inside the controller (clamping, zeroing,
//! disabling). Events only report what already happened; no consumer
//! response is required for safety.

use tracing::{error, info, warn};

use crate::joints::JointVector;
use crate::port::CouplingMatrix;

/// Something the controller wants the outside world to know about.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    /// Global enable state changed to the carried value.
    Enabled(bool),
    /// The per-joint enable mask changed; carries the new mask.
    EnabledJoints(JointVector<bool>),
    /// The joint-limit bitmap changed; carries the joints currently
    /// clamped.
    JointLimit(JointVector<bool>),
    /// A new coupling matrix was accepted.
    Coupling(CouplingMatrix),
    /// Informational message.
    Status(String),
    /// Something suspicious but not yet protective-action territory.
    Warning(String),
    /// A protective action fired or a hardware fault was reported.
    Error(String),
}

/// Consumer side of controller notifications.
///
/// Implementations must be cheap; `notify` is called from the
/// control tick.
pub trait EventSink {
    fn notify(&mut self, event: ControllerEvent);
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Enabled(on) => info!(enabled = on, "controller enable changed"),
            ControllerEvent::EnabledJoints(mask) => {
                info!(mask = ?mask.as_slice(), "per-joint enable mask changed");
            }
            ControllerEvent::JointLimit(mask) => {
                warn!(mask = ?mask.as_slice(), "joint position limit reached");
            }
            ControllerEvent::Coupling(m) => {
                info!(rows = m.rows(), cols = m.cols(), "coupling matrix updated");
            }
            ControllerEvent::Status(msg) => info!("{msg}"),
            ControllerEvent::Warning(msg) => warn!("{msg}"),
            ControllerEvent::Error(msg) => error!("{msg}"),
        }
    }
}

/// Sink that records every event, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<ControllerEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count of recorded events matching `predicate`.
    pub fn count_matching(&self, predicate: impl Fn(&ControllerEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn notify(&mut self, event: ControllerEvent) {
        self.events.push(event);
    }
}
