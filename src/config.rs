//! Config - Race and AI driver configuration
//!
//! Mirrors the values a level designer sets on the race manager and the AI
//! driver prefabs. Every field has a default so partial JSON files work.

use crate::ai::DriveState;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Number of checkpoints on the track, index 0 is the start/finish line
    pub checkpoint_count: usize,
    /// Laps to complete before a cart finishes
    pub total_laps: u32,
    /// Countdown before racing starts (seconds)
    pub countdown: f64,
    /// Randomize the starting grid when the race starts
    pub shuffle_grid: bool,
    /// Entries kept per best-times list
    pub best_times_capacity: usize,
    /// AI driver tuning
    pub ai: AiConfig,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            checkpoint_count: 3,
            total_laps: 3,
            countdown: 3.0,
            shuffle_grid: false,
            best_times_capacity: 10,
            ai: AiConfig::default(),
        }
    }
}

impl RaceConfig {
    /// Parse and validate a JSON config string
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: RaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.checkpoint_count == 0 {
            return Err(ConfigError::Invalid(
                "checkpoint_count must be at least 1".to_string(),
            ));
        }
        if self.total_laps == 0 {
            return Err(ConfigError::Invalid("total_laps must be at least 1".to_string()));
        }
        if !(self.countdown >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "countdown must be non-negative, got {}",
                self.countdown
            )));
        }
        self.ai.validate()
    }
}

/// Default timings for the AI drive states
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub spin_out_duration: f64,
    pub recovering_duration: f64,
    pub boost_duration: f64,
    pub stun_duration: f64,
    /// Speed multiplier applied while boosting
    pub boost_multiplier: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            spin_out_duration: 1.0,
            recovering_duration: 0.75,
            boost_duration: 2.0,
            stun_duration: 1.5,
            boost_multiplier: 1.5,
        }
    }
}

impl AiConfig {
    /// Configured duration of a timed state, `None` for Normal
    pub fn duration_for(&self, state: DriveState) -> Option<f64> {
        match state {
            DriveState::Normal => None,
            DriveState::SpinningOut => Some(self.spin_out_duration),
            DriveState::Recovering => Some(self.recovering_duration),
            DriveState::Boosting => Some(self.boost_duration),
            DriveState::Stunned => Some(self.stun_duration),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let durations = [
            ("spin_out_duration", self.spin_out_duration),
            ("recovering_duration", self.recovering_duration),
            ("boost_duration", self.boost_duration),
            ("stun_duration", self.stun_duration),
        ];
        for (name, value) in durations {
            if !(value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(self.boost_multiplier > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "boost_multiplier must be positive, got {}",
                self.boost_multiplier
            )));
        }
        Ok(())
    }
}
