//! Error taxonomy for the controller.
//!
//! Errors here exist only outside the control tick: configuration
//! loading, command validation, and startup checks. Faults detected
//! inside a tick are clamped, zeroed, or disabled in place and
//! surfaced through the event sink; they never propagate as errors
//! across the tick boundary.

use thiserror::Error;

use crate::joints::JointType;

/// Configuration loading/validation error.
///
/// Any variant aborts configuration and leaves the controller
/// unconfigured; no partially-populated state is produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("config I/O error: {0}")]
    Io(String),
    /// TOML parse error (includes a missing or unknown joint type
    /// tag, rejected by the closed enum).
    #[error("config parse error: {0}")]
    Parse(String),
    /// Parameter validation error.
    #[error("config validation: {0}")]
    Validation(String),
}

/// Rejected runtime command. The command leaves state unchanged.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// A vector-taking command carried the wrong joint count.
    #[error("{command}: expected {expected} joints, got {actual}")]
    SizeMismatch {
        command: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Fatal startup validation failure. The controller refuses to run
/// against hardware that disagrees with its configuration.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("hardware reports {actual} joints, configuration expects {expected}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error(
        "joint {index} ({name}): configured as {configured:?}, hardware reports {reported:?}"
    )]
    JointTypeMismatch {
        index: usize,
        name: String,
        configured: JointType,
        reported: JointType,
    },
}
