//! Controller configuration: TOML loading, validation, and unit
//! normalization.
//!
//! All config types use `serde::Deserialize` for TOML loading.
//! Optional fields carry `#[serde(default)]` so older files keep
//! loading. `validate()` runs after parsing; `normalized()` converts
//! file units (degrees, millimeters) into the internal radian/meter
//! convention so nothing downstream ever sees file units.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::joints::{JointType, MAX_JOINTS};

/// Controller type tag expected in the `[controller]` section.
pub const CONTROLLER_TYPE: &str = "PID";
/// Interface tag expected in the `[controller]` section.
pub const CONTROLLER_INTERFACE: &str = "JointTorqueInterface";

// ─── Top-Level Config ───────────────────────────────────────────────

/// Top-level controller configuration, loaded from TOML at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub controller: ControllerSection,
    /// Per-joint entries, index-aligned with hardware joint order.
    pub joints: Vec<JointEntry>,
}

/// The `[controller]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerSection {
    /// Controller type tag; must be [`CONTROLLER_TYPE`].
    #[serde(rename = "type")]
    pub kind: String,

    /// Interface tag; must be [`CONTROLLER_INTERFACE`].
    pub interface: String,

    /// Expected joint count, cross-checked against the `[[joints]]`
    /// entries and against hardware at startup.
    pub number_of_joints: usize,

    /// Target cycle time in microseconds (default: 1000 = 1ms).
    #[serde(default = "default_cycle_time_us")]
    pub cycle_time_us: u32,

    /// Use hardware velocity feedback for the derivative term when
    /// available (default: true). When false the controller
    /// finite-differences the position error instead.
    #[serde(default = "default_velocity_feedback")]
    pub velocity_feedback: bool,
}

fn default_cycle_time_us() -> u32 {
    1000
}
fn default_velocity_feedback() -> bool {
    true
}

// ─── Per-Joint Config ───────────────────────────────────────────────

/// One `[[joints]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointEntry {
    /// Human-readable joint name (e.g. "shoulder").
    pub name: String,

    /// Joint kinematic type. Required; an unknown tag fails parsing.
    #[serde(rename = "type")]
    pub joint_type: JointType,

    /// PID gains and shaping parameters.
    pub pid: PidBlock,

    /// Integral and tracking limits.
    #[serde(default)]
    pub limit: LimitBlock,

    /// Software position limits. Omitting this block on ANY joint
    /// turns joint-limit checking off for the whole controller.
    #[serde(default)]
    pub position_limit: Option<PositionLimitBlock>,
}

/// `[joints.pid]` gains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PidBlock {
    pub p_gain: f64,
    pub d_gain: f64,
    pub i_gain: f64,

    /// Constant torque offset, added after everything else
    /// (default: 0).
    #[serde(default)]
    pub offset: f64,

    /// Integral forgetting factor in (0, 1]; 1.0 keeps the full
    /// history (default: 1.0).
    #[serde(default = "default_forget")]
    pub forget: f64,

    /// Nonlinear gain-shaping breakpoint; 0 disables shaping
    /// (default: 0).
    #[serde(default)]
    pub nonlinear: f64,
}

fn default_forget() -> f64 {
    1.0
}

/// `[joints.limit]` integral clamp and tracking tolerance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitBlock {
    /// Integral clamp floor (default: -100).
    #[serde(default = "default_min_integral")]
    pub min_integral: f64,

    /// Integral clamp ceiling (default: 100).
    #[serde(default = "default_max_integral")]
    pub max_integral: f64,

    /// Tracking-error trip threshold [rad or m]. The default of 100
    /// is large enough to never trip in practice.
    #[serde(default = "default_tracking_tolerance")]
    pub tracking_tolerance: f64,

    /// Error deadband below which the error is treated as zero
    /// (default: 0).
    #[serde(default)]
    pub deadband: f64,
}

fn default_min_integral() -> f64 {
    -100.0
}
fn default_max_integral() -> f64 {
    100.0
}
fn default_tracking_tolerance() -> f64 {
    100.0
}

impl Default for LimitBlock {
    fn default() -> Self {
        Self {
            min_integral: default_min_integral(),
            max_integral: default_max_integral(),
            tracking_tolerance: default_tracking_tolerance(),
            deadband: 0.0,
        }
    }
}

/// `[joints.position_limit]` software limits in file units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionLimitBlock {
    pub unit: LimitUnit,
    pub lower: f64,
    pub upper: f64,
}

/// Unit tag for position-limit values in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitUnit {
    /// Revolute joints; converted to radians at load time.
    Degrees,
    /// Prismatic joints; converted to meters at load time.
    Millimeters,
}

impl LimitUnit {
    /// Convert a file-unit value into internal units (rad or m).
    pub fn normalized(self, value: f64) -> f64 {
        match self {
            LimitUnit::Degrees => value.to_radians(),
            LimitUnit::Millimeters => value * 1e-3,
        }
    }

    /// Joint type this unit is valid for.
    fn joint_type(self) -> JointType {
        match self {
            LimitUnit::Degrees => JointType::Revolute,
            LimitUnit::Millimeters => JointType::Prismatic,
        }
    }
}

// ─── Loading & Validation ───────────────────────────────────────────

impl ControllerConfig {
    /// Parse, validate, and normalize a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config.normalized())
    }

    /// Validate cross-field consistency and parameter sanity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.controller;
        if c.kind != CONTROLLER_TYPE {
            return Err(validation(format!(
                "controller type {:?} not supported, expected {CONTROLLER_TYPE:?}",
                c.kind
            )));
        }
        if c.interface != CONTROLLER_INTERFACE {
            return Err(validation(format!(
                "controller interface {:?} not supported, expected {CONTROLLER_INTERFACE:?}",
                c.interface
            )));
        }
        if c.number_of_joints == 0 || c.number_of_joints > MAX_JOINTS {
            return Err(validation(format!(
                "number_of_joints {} out of range [1, {MAX_JOINTS}]",
                c.number_of_joints
            )));
        }
        if c.number_of_joints != self.joints.len() {
            return Err(validation(format!(
                "number_of_joints {} does not match {} [[joints]] entries",
                c.number_of_joints,
                self.joints.len()
            )));
        }
        if c.cycle_time_us == 0 {
            return Err(validation("cycle_time_us must be positive".to_string()));
        }
        for (i, joint) in self.joints.iter().enumerate() {
            joint
                .validate()
                .map_err(|msg| validation(format!("joint {i} ({}): {msg}", joint.name)))?;
        }
        Ok(())
    }

    /// Convert all file-unit quantities into radians/meters.
    fn normalized(mut self) -> Self {
        for joint in &mut self.joints {
            if let Some(limit) = &mut joint.position_limit {
                limit.lower = limit.unit.normalized(limit.lower);
                limit.upper = limit.unit.normalized(limit.upper);
            }
        }
        self
    }
}

impl JointEntry {
    fn validate(&self) -> Result<(), String> {
        let pid = &self.pid;
        if !(pid.forget > 0.0 && pid.forget <= 1.0) {
            return Err(format!("forget {} out of range (0, 1]", pid.forget));
        }
        if pid.nonlinear < 0.0 {
            return Err(format!("nonlinear {} must be >= 0", pid.nonlinear));
        }
        let limit = &self.limit;
        if limit.min_integral > limit.max_integral {
            return Err(format!(
                "min_integral {} > max_integral {}",
                limit.min_integral, limit.max_integral
            ));
        }
        if limit.tracking_tolerance < 0.0 {
            return Err(format!(
                "tracking_tolerance {} must be >= 0",
                limit.tracking_tolerance
            ));
        }
        if limit.deadband < 0.0 {
            return Err(format!("deadband {} must be >= 0", limit.deadband));
        }
        if let Some(pos) = &self.position_limit {
            if pos.unit.joint_type() != self.joint_type {
                return Err(format!(
                    "position_limit unit {:?} does not match joint type {:?}",
                    pos.unit, self.joint_type
                ));
            }
            if pos.lower >= pos.upper {
                return Err(format!(
                    "position_limit lower {} must be below upper {}",
                    pos.lower, pos.upper
                ));
            }
        }
        Ok(())
    }
}

fn validation(msg: String) -> ConfigError {
    ConfigError::Validation(msg)
}

/// Load, validate, and normalize a controller configuration file.
pub fn load_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
    ControllerConfig::from_toml(&text)
}
