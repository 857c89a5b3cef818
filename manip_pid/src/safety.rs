//! Safety supervision: joint-limit clamping and tracking-error trip.
//!
//! Both detectors are edge-triggered for reporting (one notification
//! per bitmap change) but level-triggered for the protective action
//! itself, which is applied every evaluation the condition holds.

pub mod limits;
pub mod tracking;

pub use limits::JointLimitDetector;
pub use tracking::{TrackingDetector, TrackingOutcome};
