//! Shared library for the manipulator joint-control workspace.
//!
//! Leaf types consumed by the controller crate and by anything that
//! talks to it:
//!
//! - [`joints`] — fixed-length per-joint vectors and joint metadata
//! - [`config`] — controller descriptor structs, TOML loading,
//!   validation, unit normalization
//! - [`error`] — configuration / command / startup error taxonomy
//! - [`event`] — controller event types and the [`event::EventSink`]
//!   notification boundary
//! - [`port`] — the [`port::RobotPort`] hardware feedback/command
//!   boundary

pub mod config;
pub mod error;
pub mod event;
pub mod joints;
pub mod port;
