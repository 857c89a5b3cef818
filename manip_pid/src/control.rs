//! Per-tick control computation.

pub mod pid;

pub use pid::{PidState, TickInput, compute_tick};
