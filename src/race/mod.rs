//! Race Module
//!
//! Checkpoint sequencing, lap completion, finish detection and the
//! leaderboard.

pub mod progress;
pub mod tracker;

pub use progress::RaceProgress;
pub use tracker::{RaceResult, RaceTracker};
