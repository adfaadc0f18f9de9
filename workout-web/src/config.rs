//! Detector configuration
//!
//! One TOML table per activity. Every field has a default, so a file only
//! needs to name the thresholds it changes:
//!
//! ```toml
//! [pushup]
//! down_angle = 85.0
//!
//! [broad_jump]
//! policy = "valid_only"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::detectors::{
    BroadJumpConfig, PullupConfig, PushupConfig, ShuttleRunConfig, SitAndReachConfig,
    SitupConfig, VerticalJumpConfig,
};
use crate::error::{Result, WorkoutError};

/// Thresholds for every detector
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub pushup: PushupConfig,
    pub pullup: PullupConfig,
    pub situp: SitupConfig,
    pub vertical_jump: VerticalJumpConfig,
    pub shuttle_run: ShuttleRunConfig,
    pub broad_jump: BroadJumpConfig,
    pub sit_and_reach: SitAndReachConfig,
}

impl DetectorConfig {
    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Check every detector's thresholds
    pub fn validate(&self) -> Result<()> {
        self.pushup.validate()?;
        self.pullup.validate()?;
        self.situp.validate()?;
        self.vertical_jump.validate()?;
        self.shuttle_run.validate()?;
        self.broad_jump.validate()?;
        self.sit_and_reach.validate()
    }
}

// ============================================================================
// FIELD CHECKS
// ============================================================================

pub(crate) fn check_window(name: &str, window: usize) -> Result<()> {
    if window == 0 {
        return Err(WorkoutError::invalid_config(format!("{name} must be at least 1")));
    }
    Ok(())
}

pub(crate) fn check_finite(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(WorkoutError::invalid_config(format!(
            "{name} must be finite, got {value}"
        )));
    }
    Ok(())
}

pub(crate) fn check_non_negative(name: &str, value: f64) -> Result<()> {
    check_finite(name, value)?;
    if value < 0.0 {
        return Err(WorkoutError::invalid_config(format!(
            "{name} must not be negative, got {value}"
        )));
    }
    Ok(())
}
