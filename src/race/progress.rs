//! Progress - Per-cart race progress
//!
//! Lap, checkpoint sequencing and finish state for a single cart. Only the
//! tracker mutates these records; collaborators get shared references.

use crate::cart::Cart;
use serde::{Deserialize, Serialize};

/// Largest spline fraction kept, the fraction is half-open in [0, 1)
pub const MAX_SPLINE_PROGRESS: f64 = 1.0 - f64::EPSILON;

/// Race progress of a single cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceProgress {
    /// The cart this record belongs to
    pub cart: Cart,
    /// Current lap, starting at 1
    pub current_lap: u32,
    /// Only this checkpoint index is accepted next
    pub next_expected_checkpoint: usize,
    /// Last accepted checkpoint, `None` before the first crossing
    pub last_checkpoint_passed: Option<usize>,
    /// Set when the final checkpoint of the lap was crossed
    pub has_passed_final_checkpoint: bool,
    /// Race clock value when racing started
    pub race_start_timestamp: Option<f64>,
    /// Elapsed race time at the finish
    pub finish_timestamp: Option<f64>,
    pub is_finished: bool,
    /// Elapsed race time at each completed lap
    pub lap_timestamps: Vec<f64>,
    /// Fraction of the way from the last to the next checkpoint
    pub spline_progress: f64,
}

impl RaceProgress {
    pub fn new(cart: Cart) -> Self {
        Self {
            cart,
            current_lap: 1,
            next_expected_checkpoint: 0,
            last_checkpoint_passed: None,
            has_passed_final_checkpoint: false,
            race_start_timestamp: None,
            finish_timestamp: None,
            is_finished: false,
            lap_timestamps: Vec::new(),
            spline_progress: 0.0,
        }
    }

    /// Back to the starting state, keeping the cart
    pub fn reset(&mut self) {
        let cart = self.cart.clone();
        *self = Self::new(cart);
    }

    /// Whether a crossing of `checkpoint` would be accepted
    pub fn accepts(&self, checkpoint: usize) -> bool {
        !self.is_finished && checkpoint == self.next_expected_checkpoint
    }

    /// Distance travelled as a single scalar:
    /// `lap * checkpoint_count + last_checkpoint + spline_progress`
    pub fn track_progress_score(&self, checkpoint_count: usize) -> f64 {
        let last = self
            .last_checkpoint_passed
            .map(|c| c as f64)
            .unwrap_or(-1.0);
        self.current_lap as f64 * checkpoint_count as f64 + last + self.spline_progress
    }

    /// Duration of every completed lap
    pub fn lap_times(&self) -> Vec<f64> {
        let mut previous = 0.0;
        self.lap_timestamps
            .iter()
            .map(|&t| {
                let lap = t - previous;
                previous = t;
                lap
            })
            .collect()
    }

    pub fn best_lap(&self) -> Option<f64> {
        self.lap_times().into_iter().min_by(|a, b| a.total_cmp(b))
    }

    /// Laps fully completed so far
    pub fn completed_laps(&self) -> u32 {
        self.lap_timestamps.len() as u32
    }
}
