//! Error types
//!
//! Nothing in the race core is fatal. These errors only tell a caller that a
//! request was refused or that a configuration could not be loaded.

use crate::ai::DriveState;
use std::error::Error;
use std::fmt;

/// A drive state change that the transition table does not allow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionError {
    pub from: DriveState,
    pub to: DriveState,
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "illegal drive state transition {:?} -> {:?}", self.from, self.to)
    }
}

impl Error for TransitionError {}

/// ConfigError is returned when a race configuration cannot be read or does not
/// fulfill the posed requirements, e.g. a track without checkpoints.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read race config: {}", e),
            ConfigError::Parse(e) => write!(f, "failed to parse race config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "invalid race config: {}", msg),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
