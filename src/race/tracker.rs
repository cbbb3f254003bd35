//! Tracker - Race progress and leaderboard
//!
//! Accepts checkpoint crossings in strict cyclic order, completes laps,
//! records the finish order and derives the leaderboard on demand.
//! Out-of-order, duplicate and unknown-cart events are ignored: trigger
//! volumes fire twice or get missed, and a running race must not care.

use crate::cart::{Cart, CartId};
use crate::config::RaceConfig;
use crate::events::{EventChannel, RaceEvent};
use crate::race::progress::{RaceProgress, MAX_SPLINE_PROGRESS};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Final standing of a finished cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub cart_id: CartId,
    pub cart_name: String,
    pub finish_time: f64,
    pub position: u32,
}

#[derive(Debug)]
pub struct RaceTracker {
    checkpoint_count: usize,
    total_laps: u32,
    /// Gate set by the session controller
    racing: bool,
    /// Cleared once the countdown begins, set again on reset
    registration_open: bool,
    /// Elapsed race clock (seconds)
    clock: f64,
    /// Progress records in grid order
    progress: Vec<RaceProgress>,
    finish_order: Vec<CartId>,
    /// Positions as last broadcast
    last_positions: HashMap<CartId, usize>,
    events: EventChannel<RaceEvent>,
    /// Events emitted since the last drain
    recent: Vec<RaceEvent>,
}

impl RaceTracker {
    pub fn new(config: &RaceConfig) -> Self {
        Self {
            checkpoint_count: config.checkpoint_count.max(1),
            total_laps: config.total_laps,
            racing: false,
            registration_open: true,
            clock: 0.0,
            progress: Vec::new(),
            finish_order: Vec::new(),
            last_positions: HashMap::new(),
            events: EventChannel::new(),
            recent: Vec::new(),
        }
    }

    /// Race event observers
    pub fn events(&mut self) -> &mut EventChannel<RaceEvent> {
        &mut self.events
    }

    /// Take the events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<RaceEvent> {
        std::mem::take(&mut self.recent)
    }

    // ---------------------------------------------------------------------------------------------
    // SETUP ---------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Register a cart before the race. Returns false if it was already
    /// registered or registration has closed.
    pub fn register_cart(&mut self, cart: Cart) -> bool {
        if !self.registration_open {
            log::warn!("Cart {} ({}) not registered, race already started", cart.id, cart.name);
            return false;
        }
        if self.is_registered(cart.id) {
            return false;
        }
        log::debug!("Registered cart {} ({})", cart.id, cart.name);
        self.progress.push(RaceProgress::new(cart));
        true
    }

    /// Randomize the grid order, which breaks ties between equal scores
    pub fn shuffle_grid<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.racing {
            return false;
        }
        self.progress.shuffle(rng);
        true
    }

    /// Refuse further registrations, called when the countdown begins
    pub fn close_registration(&mut self) {
        self.registration_open = false;
    }

    pub fn is_registration_open(&self) -> bool {
        self.registration_open
    }

    /// Open the racing gate and stamp the race start on every cart
    pub fn start_racing(&mut self) {
        if self.racing {
            return;
        }
        self.racing = true;
        self.registration_open = false;
        let now = self.clock;
        for progress in &mut self.progress {
            progress.race_start_timestamp = Some(now);
        }
        self.refresh_positions();
    }

    pub fn stop_racing(&mut self) {
        self.racing = false;
    }

    pub fn is_racing(&self) -> bool {
        self.racing
    }

    pub fn advance_clock(&mut self, delta: f64) {
        if self.racing && delta >= 0.0 {
            self.clock += delta;
        }
    }

    /// Restart: every cart back on the grid, registrations kept
    pub fn reset(&mut self) {
        self.racing = false;
        self.registration_open = true;
        self.clock = 0.0;
        self.finish_order.clear();
        self.last_positions.clear();
        self.recent.clear();
        for progress in &mut self.progress {
            progress.reset();
        }
    }

    /// Drop every registration
    pub fn clear(&mut self) {
        self.reset();
        self.progress.clear();
    }

    // ---------------------------------------------------------------------------------------------
    // RACE EVENTS ---------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Handle a checkpoint crossing. Returns whether the crossing was accepted.
    pub fn record_checkpoint_passed(&mut self, cart: CartId, checkpoint: usize) -> bool {
        if !self.racing {
            log::debug!("Ignored checkpoint {} for cart {}, not racing", checkpoint, cart);
            return false;
        }

        let count = self.checkpoint_count;
        let Some(progress) = self.progress.iter_mut().find(|p| p.cart.id == cart) else {
            log::debug!("Ignored checkpoint {} for unregistered cart {}", checkpoint, cart);
            return false;
        };

        if !progress.accepts(checkpoint) {
            log::debug!(
                "Ignored checkpoint {} for cart {}, expected {}",
                checkpoint,
                cart,
                progress.next_expected_checkpoint
            );
            return false;
        }

        // Evaluated before this crossing can set the flag: on a one-checkpoint
        // track the first crossing only arms it.
        let completes_lap = checkpoint == 0 && progress.has_passed_final_checkpoint;

        progress.last_checkpoint_passed = Some(checkpoint);
        progress.next_expected_checkpoint = (checkpoint + 1) % count;
        progress.spline_progress = 0.0;
        if completes_lap {
            progress.has_passed_final_checkpoint = false;
        }
        if checkpoint == count - 1 {
            progress.has_passed_final_checkpoint = true;
        }

        if completes_lap {
            self.complete_lap(cart);
        }

        self.refresh_positions();
        true
    }

    /// Count a lap for `cart` and finish it once it runs past the last lap
    pub fn complete_lap(&mut self, cart: CartId) -> bool {
        if !self.racing {
            return false;
        }

        let now = self.clock;
        let Some(progress) = self.progress.iter_mut().find(|p| p.cart.id == cart) else {
            return false;
        };
        if progress.is_finished {
            return false;
        }

        progress.current_lap += 1;
        let elapsed = now - progress.race_start_timestamp.unwrap_or(0.0);
        progress.lap_timestamps.push(elapsed);
        let new_lap = progress.current_lap;

        log::info!("Cart {} completed lap {} at {:.3}s", cart, new_lap - 1, elapsed);
        self.emit(RaceEvent::LapCompleted { cart, new_lap });

        if new_lap > self.total_laps {
            self.finish_race(cart);
        }
        true
    }

    /// Mark `cart` finished. Finishing twice is a no-op.
    pub fn finish_race(&mut self, cart: CartId) -> bool {
        if !self.racing {
            return false;
        }

        let now = self.clock;
        let Some(progress) = self.progress.iter_mut().find(|p| p.cart.id == cart) else {
            return false;
        };
        if progress.is_finished {
            return false;
        }

        progress.is_finished = true;
        let finish_time = now - progress.race_start_timestamp.unwrap_or(0.0);
        progress.finish_timestamp = Some(finish_time);

        self.finish_order.push(cart);
        let position = self.finish_order.len();

        log::info!("Cart {} finished in position {} at {:.3}s", cart, position, finish_time);
        self.emit(RaceEvent::Finished { cart, position });
        true
    }

    /// Update the spline fraction between the last and next checkpoint
    pub fn set_spline_progress(&mut self, cart: CartId, value: f64) {
        if !self.racing {
            log::debug!("Ignored spline progress for cart {}, not racing", cart);
            return;
        }
        if !value.is_finite() {
            return;
        }
        if let Some(progress) = self
            .progress
            .iter_mut()
            .find(|p| p.cart.id == cart && !p.is_finished)
        {
            progress.spline_progress = value.clamp(0.0, MAX_SPLINE_PROGRESS);
        }
    }

    /// Recompute standings and broadcast every position that moved
    pub fn refresh_positions(&mut self) {
        let board = self.leaderboard();
        for (i, cart) in board.into_iter().enumerate() {
            let position = i + 1;
            if self.last_positions.insert(cart, position) != Some(position) {
                self.emit(RaceEvent::PositionChanged { cart, position });
            }
        }
    }

    fn emit(&mut self, event: RaceEvent) {
        self.recent.push(event);
        self.events.emit(&event);
    }

    // ---------------------------------------------------------------------------------------------
    // READS ---------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Finished carts in finish order, then the rest by track progress score.
    /// Equal scores keep grid order.
    pub fn leaderboard(&self) -> Vec<CartId> {
        let count = self.checkpoint_count;
        let mut running: Vec<(CartId, f64)> = self
            .progress
            .iter()
            .filter(|p| !p.is_finished)
            .map(|p| (p.cart.id, p.track_progress_score(count)))
            .collect();
        running.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut board = self.finish_order.clone();
        board.extend(running.into_iter().map(|(id, _)| id));
        board
    }

    /// 1-based rank, 0 for unknown carts
    pub fn position(&self, cart: CartId) -> usize {
        if let Some(i) = self.finish_order.iter().position(|&id| id == cart) {
            return i + 1;
        }
        self.leaderboard()
            .iter()
            .position(|&id| id == cart)
            .map(|i| i + 1)
            .unwrap_or(0)
    }

    pub fn progress(&self, cart: CartId) -> Option<&RaceProgress> {
        self.progress.iter().find(|p| p.cart.id == cart)
    }

    /// Progress records in grid order
    pub fn all_progress(&self) -> &[RaceProgress] {
        &self.progress
    }

    pub fn is_registered(&self, cart: CartId) -> bool {
        self.progress(cart).is_some()
    }

    pub fn cart_count(&self) -> usize {
        self.progress.len()
    }

    pub fn track_progress_score(&self, cart: CartId) -> Option<f64> {
        self.progress(cart)
            .map(|p| p.track_progress_score(self.checkpoint_count))
    }

    pub fn lap_times(&self, cart: CartId) -> Vec<f64> {
        self.progress(cart).map(|p| p.lap_times()).unwrap_or_default()
    }

    pub fn best_lap(&self, cart: CartId) -> Option<f64> {
        self.progress(cart).and_then(|p| p.best_lap())
    }

    pub fn finish_order(&self) -> &[CartId] {
        &self.finish_order
    }

    /// Finished carts with their times, in finish order
    pub fn results(&self) -> Vec<RaceResult> {
        self.finish_order
            .iter()
            .enumerate()
            .filter_map(|(i, &id)| {
                self.progress(id).map(|p| RaceResult {
                    cart_id: id,
                    cart_name: p.cart.name.clone(),
                    finish_time: p.finish_timestamp.unwrap_or(0.0),
                    position: (i + 1) as u32,
                })
            })
            .collect()
    }

    pub fn all_finished(&self) -> bool {
        !self.progress.is_empty() && self.progress.iter().all(|p| p.is_finished)
    }

    pub fn elapsed(&self) -> f64 {
        self.clock
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoint_count
    }

    pub fn total_laps(&self) -> u32 {
        self.total_laps
    }
}
