//! Session - Race-state controller and per-frame loop
//!
//! Owns the race tracker and the AI drivers, gates them on the race status
//! and processes each frame in a fixed order: countdown, queued inputs,
//! race clock, AI timers, standings, best times, finish check.

use crate::ai::{AiDriveStateMachine, DriveEffects, DriveState};
use crate::best_times::BestTimes;
use crate::cart::{Cart, CartId};
use crate::config::RaceConfig;
use crate::error::{ConfigError, TransitionError};
use crate::events::{DriveEvent, EventChannel, RaceEvent};
use crate::race::{RaceResult, RaceTracker};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    Countdown,
    Racing,
    Finished,
}

/// External event queued for the next tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SessionInput {
    /// A checkpoint trigger fired
    CheckpointPassed { cart: CartId, checkpoint: usize },
    /// Spline tracker position between checkpoints
    SplineProgress { cart: CartId, value: f64 },
    /// Item hit or collision forcing a drive state
    DriveStateRequest {
        cart: CartId,
        state: DriveState,
        duration: f64,
    },
    /// Boost pickup with its own multiplier
    BoostRequest {
        cart: CartId,
        duration: f64,
        multiplier: f64,
    },
}

/// Compact cart state for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub id: CartId,
    pub name: String,
    pub position: usize,
    pub lap: u32,
    pub next_checkpoint: usize,
    pub finished: bool,
    /// `None` for human-controlled carts
    pub drive_state: Option<DriveState>,
}

/// Compact race snapshot, carts in leaderboard order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub paused: bool,
    pub elapsed_time: f64,
    pub countdown: f64,
    pub total_laps: u32,
    pub carts: Vec<CartSnapshot>,
    pub finisher_count: u32,
}

/// Everything one tick produced
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub snapshot: RaceSnapshot,
    /// Race events emitted during the tick, in emission order
    pub events: Vec<RaceEvent>,
    /// Queued drive state requests the AI refused
    pub rejected: Vec<TransitionError>,
}

/// Session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStats {
    pub tick_count: u64,
    pub cart_count: u32,
    pub ai_driver_count: u32,
    pub pending_inputs: u32,
    pub status: RaceStatus,
}

/// Main race session
#[derive(Debug)]
pub struct RaceSession {
    config: RaceConfig,
    /// Current race status
    status: RaceStatus,
    paused: bool,
    /// Countdown remaining (seconds)
    countdown: f64,
    tracker: RaceTracker,
    drivers: Vec<AiDriveStateMachine>,
    inputs: VecDeque<SessionInput>,
    best_times: BestTimes,
    tick_count: u64,
}

impl RaceSession {
    /// Create a session from a validated config
    pub fn new(config: RaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: RaceConfig) -> Self {
        Self {
            status: RaceStatus::NotStarted,
            paused: false,
            countdown: config.countdown,
            tracker: RaceTracker::new(&config),
            drivers: Vec::new(),
            inputs: VecDeque::new(),
            best_times: BestTimes::new(config.best_times_capacity),
            tick_count: 0,
            config,
        }
    }

    /// Replace the config and drop every cart. Best times and race event
    /// observers are kept.
    pub fn init_race(&mut self, config: RaceConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let observers = std::mem::take(self.tracker.events());
        let mut best_times = std::mem::take(&mut self.best_times);
        best_times.capacity = config.best_times_capacity;
        best_times.laps.truncate(config.best_times_capacity);
        best_times.races.truncate(config.best_times_capacity);

        *self = Self::build(config);
        self.best_times = best_times;
        *self.tracker.events() = observers;
        log::info!(
            "Race initialized: {} checkpoints, {} laps",
            self.config.checkpoint_count,
            self.config.total_laps
        );
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // SETUP ---------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Register a human-controlled cart, only before the race starts
    pub fn register_cart(&mut self, cart: Cart) -> bool {
        if self.status != RaceStatus::NotStarted {
            log::warn!("Cart {} not registered, race already started", cart.id);
            return false;
        }
        self.tracker.register_cart(cart)
    }

    /// Register an AI-controlled cart with its own drive state machine
    pub fn register_ai_driver(&mut self, cart: Cart) -> bool {
        if self.status != RaceStatus::NotStarted {
            log::warn!("AI driver {} not registered, race already started", cart.id);
            return false;
        }
        let id = cart.id;
        if self.driver(id).is_some() {
            return false;
        }
        if !self.tracker.register_cart(cart) {
            return false;
        }
        self.drivers.push(AiDriveStateMachine::new(id, &self.config.ai));
        true
    }

    /// Start the countdown, shuffling the grid if configured
    pub fn start_race(&mut self) -> bool {
        self.start_race_with_rng(&mut rand::thread_rng())
    }

    pub fn start_race_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.status != RaceStatus::NotStarted {
            return false;
        }
        if self.config.shuffle_grid {
            self.tracker.shuffle_grid(rng);
        }

        self.tracker.close_registration();
        self.status = RaceStatus::Countdown;
        self.countdown = self.config.countdown;
        log::info!("Countdown started with {} carts", self.tracker.cart_count());

        if self.countdown <= 0.0 {
            self.begin_racing();
        }
        true
    }

    fn begin_racing(&mut self) {
        self.status = RaceStatus::Racing;
        self.countdown = 0.0;
        self.tracker.start_racing();
        log::info!("Race started");
    }

    // ---------------------------------------------------------------------------------------------
    // FRAME LOOP ----------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Queue an external event for the next tick
    pub fn push(&mut self, input: SessionInput) {
        self.inputs.push_back(input);
    }

    /// Perform a single frame
    pub fn tick(&mut self, delta: f64) -> Option<TickReport> {
        if self.paused || !(delta >= 0.0) {
            return None;
        }
        self.tick_count += 1;

        let mut started_this_tick = false;
        if self.status == RaceStatus::Countdown {
            self.countdown -= delta;
            if self.countdown <= 0.0 {
                self.begin_racing();
                started_this_tick = true;
            }
        }

        let mut rejected = Vec::new();
        while let Some(input) = self.inputs.pop_front() {
            if let Err(e) = self.apply_input(input) {
                rejected.push(e);
            }
        }

        if self.status == RaceStatus::Racing && !started_this_tick {
            self.tracker.advance_clock(delta);
        }
        if matches!(self.status, RaceStatus::Racing | RaceStatus::Finished) && !started_this_tick {
            for driver in &mut self.drivers {
                driver.advance(delta);
            }
        }

        if self.status == RaceStatus::Racing {
            self.tracker.refresh_positions();
        }

        let events = self.tracker.drain_events();
        self.record_best_times(&events);

        if self.status == RaceStatus::Racing && self.tracker.all_finished() {
            self.status = RaceStatus::Finished;
            self.tracker.stop_racing();
            log::info!("Race finished after {:.3}s", self.tracker.elapsed());
        }

        Some(TickReport {
            snapshot: self.snapshot(),
            events,
            rejected,
        })
    }

    fn apply_input(&mut self, input: SessionInput) -> Result<(), TransitionError> {
        match input {
            SessionInput::CheckpointPassed { cart, checkpoint } => {
                self.tracker.record_checkpoint_passed(cart, checkpoint);
                Ok(())
            }
            SessionInput::SplineProgress { cart, value } => {
                self.tracker.set_spline_progress(cart, value);
                Ok(())
            }
            SessionInput::DriveStateRequest {
                cart,
                state,
                duration,
            } => match self.racing_driver_mut(cart) {
                Some(driver) => driver.try_change_state(state, duration),
                None => Ok(()),
            },
            SessionInput::BoostRequest {
                cart,
                duration,
                multiplier,
            } => match self.racing_driver_mut(cart) {
                Some(driver) => driver.request_boost(duration, multiplier),
                None => Ok(()),
            },
        }
    }

    fn racing_driver_mut(&mut self, cart: CartId) -> Option<&mut AiDriveStateMachine> {
        if self.status != RaceStatus::Racing {
            log::debug!("Dropped drive request for cart {}, not racing", cart);
            return None;
        }
        let driver = self.drivers.iter_mut().find(|d| d.cart() == cart);
        if driver.is_none() {
            log::warn!("Drive request for cart {} without an AI driver", cart);
        }
        driver
    }

    fn record_best_times(&mut self, events: &[RaceEvent]) {
        for event in events {
            match *event {
                RaceEvent::LapCompleted { cart, .. } => {
                    let Some(progress) = self.tracker.progress(cart) else {
                        continue;
                    };
                    if let Some(&lap) = progress.lap_times().last() {
                        let name = progress.cart.name.clone();
                        self.best_times.record_lap(&name, lap);
                    }
                }
                RaceEvent::Finished { cart, .. } => {
                    let Some(progress) = self.tracker.progress(cart) else {
                        continue;
                    };
                    if let Some(time) = progress.finish_timestamp {
                        let name = progress.cart.name.clone();
                        self.best_times.record_race(&name, time);
                    }
                }
                RaceEvent::PositionChanged { .. } => {}
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // CONTROL -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Pause the simulation
    pub fn pause(&mut self) {
        if matches!(self.status, RaceStatus::Countdown | RaceStatus::Racing) {
            self.paused = true;
        }
    }

    /// Resume the simulation
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Same carts back on the grid, AI drivers back to Normal
    pub fn restart(&mut self) {
        self.tracker.reset();
        for driver in &mut self.drivers {
            driver.reset();
        }
        self.inputs.clear();
        self.status = RaceStatus::NotStarted;
        self.paused = false;
        self.countdown = self.config.countdown;
        log::info!("Race restarted");
    }

    /// Reset to an empty session
    pub fn reset(&mut self) {
        self.tracker.clear();
        self.drivers.clear();
        self.inputs.clear();
        self.status = RaceStatus::NotStarted;
        self.paused = false;
        self.countdown = self.config.countdown;
        self.tick_count = 0;
        log::info!("Race reset");
    }

    // ---------------------------------------------------------------------------------------------
    // GUARDS & READS ------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// Whether movement input may be applied to `cart`
    pub fn can_move(&self, cart: CartId) -> bool {
        if !matches!(self.status, RaceStatus::Racing | RaceStatus::Finished) || self.paused {
            return false;
        }
        self.tracker.is_registered(cart) && self.driver(cart).map_or(true, |d| d.can_move())
    }

    /// Whether `cart` may activate an item
    pub fn can_use_items(&self, cart: CartId) -> bool {
        if self.status != RaceStatus::Racing || self.paused {
            return false;
        }
        let finished = self
            .tracker
            .progress(cart)
            .map_or(true, |p| p.is_finished);
        !finished && self.driver(cart).map_or(true, |d| d.can_use_items())
    }

    pub fn status(&self) -> RaceStatus {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn tracker(&self) -> &RaceTracker {
        &self.tracker
    }

    pub fn driver(&self, cart: CartId) -> Option<&AiDriveStateMachine> {
        self.drivers.iter().find(|d| d.cart() == cart)
    }

    fn driver_mut(&mut self, cart: CartId) -> Option<&mut AiDriveStateMachine> {
        self.drivers.iter_mut().find(|d| d.cart() == cart)
    }

    pub fn set_drive_effects(&mut self, cart: CartId, effects: impl DriveEffects + 'static) -> bool {
        match self.driver_mut(cart) {
            Some(driver) => {
                driver.set_effects(effects);
                true
            }
            None => false,
        }
    }

    pub fn race_events(&mut self) -> &mut EventChannel<RaceEvent> {
        self.tracker.events()
    }

    pub fn drive_events(&mut self, cart: CartId) -> Option<&mut EventChannel<DriveEvent>> {
        self.driver_mut(cart).map(|d| d.events())
    }

    pub fn leaderboard(&self) -> Vec<CartId> {
        self.tracker.leaderboard()
    }

    pub fn position(&self, cart: CartId) -> usize {
        self.tracker.position(cart)
    }

    /// Get race results
    pub fn results(&self) -> Vec<RaceResult> {
        self.tracker.results()
    }

    pub fn best_times(&self) -> &BestTimes {
        &self.best_times
    }

    /// Load previously saved best times
    pub fn set_best_times(&mut self, best_times: BestTimes) {
        self.best_times = best_times;
    }

    /// Get current race snapshot
    pub fn snapshot(&self) -> RaceSnapshot {
        let carts = self
            .tracker
            .leaderboard()
            .into_iter()
            .enumerate()
            .filter_map(|(i, id)| {
                self.tracker.progress(id).map(|p| CartSnapshot {
                    id,
                    name: p.cart.name.clone(),
                    position: i + 1,
                    lap: p.current_lap,
                    next_checkpoint: p.next_expected_checkpoint,
                    finished: p.is_finished,
                    drive_state: self.driver(id).map(|d| d.state()),
                })
            })
            .collect();

        RaceSnapshot {
            status: self.status,
            paused: self.paused,
            elapsed_time: self.tracker.elapsed(),
            countdown: self.countdown,
            total_laps: self.config.total_laps,
            carts,
            finisher_count: self.tracker.finish_order().len() as u32,
        }
    }

    /// Get session statistics
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            tick_count: self.tick_count,
            cart_count: self.tracker.cart_count() as u32,
            ai_driver_count: self.drivers.len() as u32,
            pending_inputs: self.inputs.len() as u32,
            status: self.status,
        }
    }
}

impl Default for RaceSession {
    fn default() -> Self {
        Self::build(RaceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session(countdown: f64) -> RaceSession {
        let config = RaceConfig {
            checkpoint_count: 3,
            total_laps: 2,
            countdown,
            ..Default::default()
        };
        RaceSession::new(config).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = RaceConfig {
            checkpoint_count: 0,
            ..Default::default()
        };
        assert!(RaceSession::new(config).is_err());
    }

    #[test]
    fn test_countdown_then_racing() {
        let mut session = session(3.0);
        session.register_cart(Cart::new(1, "Mario"));
        assert!(session.start_race());
        assert!(!session.start_race());
        assert_eq!(session.status(), RaceStatus::Countdown);
        assert!(!session.can_move(CartId(1)));

        session.tick(2.0);
        assert_eq!(session.status(), RaceStatus::Countdown);
        session.tick(1.0);
        assert_eq!(session.status(), RaceStatus::Racing);
        assert!(session.can_move(CartId(1)));
        assert_relative_eq!(session.tracker().elapsed(), 0.0);

        session.tick(0.5);
        assert_relative_eq!(session.tracker().elapsed(), 0.5);
    }

    #[test]
    fn test_registration_closed_after_start() {
        let mut session = session(0.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.start_race();
        assert_eq!(session.status(), RaceStatus::Racing);

        assert!(!session.register_cart(Cart::new(2, "Luigi")));
        assert!(!session.register_ai_driver(Cart::new(3, "Koopa")));
    }

    #[test]
    fn test_checkpoints_during_countdown_ignored() {
        let mut session = session(1.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.start_race();

        session.push(SessionInput::CheckpointPassed {
            cart: CartId(1),
            checkpoint: 0,
        });
        session.tick(0.5);

        let progress = session.tracker().progress(CartId(1)).unwrap();
        assert_eq!(progress.last_checkpoint_passed, None);
        assert_eq!(session.stats().pending_inputs, 0);
    }

    #[test]
    fn test_spline_progress_during_countdown_dropped() {
        let mut session = session(3.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.register_cart(Cart::new(2, "Luigi"));
        session.start_race();

        session.push(SessionInput::SplineProgress {
            cart: CartId(2),
            value: 0.9,
        });
        session.tick(0.1);

        assert_eq!(session.status(), RaceStatus::Countdown);
        assert_relative_eq!(
            session.tracker().progress(CartId(2)).unwrap().spline_progress,
            0.0
        );
        assert_eq!(session.leaderboard(), vec![CartId(1), CartId(2)]);
    }

    #[test]
    fn test_registration_closed_during_countdown() {
        let mut session = session(3.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.start_race();

        assert!(!session.register_cart(Cart::new(2, "Luigi")));
        assert!(!session.tracker().is_registration_open());

        session.restart();
        assert!(session.register_cart(Cart::new(2, "Luigi")));
    }

    #[test]
    fn test_inputs_apply_before_ai_timers() {
        let mut session = session(0.0);
        session.register_ai_driver(Cart::new(1, "Koopa"));
        session.start_race();

        session.push(SessionInput::DriveStateRequest {
            cart: CartId(1),
            state: DriveState::Stunned,
            duration: 1.0,
        });
        let report = session.tick(1.0).unwrap();

        // Stun applied, then its full duration elapsed in the same frame
        assert!(report.rejected.is_empty());
        assert_eq!(session.driver(CartId(1)).unwrap().state(), DriveState::Normal);
    }

    #[test]
    fn test_rejected_requests_reported() {
        let mut session = session(0.0);
        session.register_ai_driver(Cart::new(1, "Koopa"));
        session.start_race();

        session.push(SessionInput::DriveStateRequest {
            cart: CartId(1),
            state: DriveState::Stunned,
            duration: 1.0,
        });
        session.push(SessionInput::BoostRequest {
            cart: CartId(1),
            duration: 2.0,
            multiplier: 2.0,
        });
        let report = session.tick(0.1).unwrap();

        assert_eq!(
            report.rejected,
            vec![TransitionError {
                from: DriveState::Stunned,
                to: DriveState::Boosting,
            }]
        );
        assert!(!session.can_move(CartId(1)));
        assert!(!session.can_use_items(CartId(1)));
    }

    #[test]
    fn test_drive_requests_dropped_before_racing() {
        let mut session = session(5.0);
        session.register_ai_driver(Cart::new(1, "Koopa"));
        session.start_race();

        session.push(SessionInput::DriveStateRequest {
            cart: CartId(1),
            state: DriveState::SpinningOut,
            duration: 1.0,
        });
        session.tick(0.1);
        assert_eq!(session.driver(CartId(1)).unwrap().state(), DriveState::Normal);
    }

    #[test]
    fn test_pause_holds_inputs() {
        let mut session = session(0.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.start_race();
        session.pause();

        session.push(SessionInput::CheckpointPassed {
            cart: CartId(1),
            checkpoint: 0,
        });
        assert!(session.tick(1.0).is_none());
        assert_eq!(session.stats().pending_inputs, 1);
        assert!(!session.can_move(CartId(1)));

        session.resume();
        session.tick(1.0);
        assert_eq!(
            session.tracker().progress(CartId(1)).unwrap().last_checkpoint_passed,
            Some(0)
        );
    }

    #[test]
    fn test_race_finishes_when_everyone_is_home() {
        let mut session = session(0.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.register_ai_driver(Cart::new(2, "Koopa"));
        session.start_race();

        for cart in [1, 2] {
            for checkpoint in [0, 1, 2, 0, 1, 2, 0] {
                session.push(SessionInput::CheckpointPassed {
                    cart: CartId(cart),
                    checkpoint,
                });
            }
            let report = session.tick(10.0).unwrap();
            assert!(report
                .events
                .iter()
                .any(|e| matches!(e, RaceEvent::Finished { cart: c, .. } if *c == CartId(cart))));
        }

        assert_eq!(session.status(), RaceStatus::Finished);
        assert!(!session.can_use_items(CartId(1)));
        assert!(session.can_move(CartId(1)));

        let results = session.results();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].cart_name, "Mario");
        assert_relative_eq!(results[0].finish_time, 0.0);
        assert_relative_eq!(results[1].finish_time, 10.0);

        let best = session.best_times();
        assert_eq!(best.best_race().unwrap().name, "Koopa");
    }

    #[test]
    fn test_snapshot_in_leaderboard_order() {
        let mut session = session(0.0);
        session.register_cart(Cart::new(1, "Mario"));
        session.register_ai_driver(Cart::new(2, "Koopa"));
        session.start_race();

        session.push(SessionInput::CheckpointPassed {
            cart: CartId(2),
            checkpoint: 0,
        });
        session.tick(0.1);

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, RaceStatus::Racing);
        assert_eq!(snapshot.carts[0].id, CartId(2));
        assert_eq!(snapshot.carts[0].position, 1);
        assert_eq!(snapshot.carts[0].drive_state, Some(DriveState::Normal));
        assert_eq!(snapshot.carts[1].drive_state, None);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"Racing\""));
    }

    #[test]
    fn test_restart_keeps_carts_and_best_times() {
        let mut session = session(0.0);
        session.register_ai_driver(Cart::new(1, "Koopa"));
        session.start_race();
        for checkpoint in [0, 1, 2] {
            session.push(SessionInput::CheckpointPassed {
                cart: CartId(1),
                checkpoint,
            });
        }
        session.tick(12.0);
        session.push(SessionInput::CheckpointPassed {
            cart: CartId(1),
            checkpoint: 0,
        });
        session.push(SessionInput::DriveStateRequest {
            cart: CartId(1),
            state: DriveState::SpinningOut,
            duration: 5.0,
        });
        session.tick(0.1);
        assert_eq!(session.best_times().laps.len(), 1);

        session.restart();

        assert_eq!(session.status(), RaceStatus::NotStarted);
        assert_eq!(session.stats().cart_count, 1);
        assert_eq!(session.driver(CartId(1)).unwrap().state(), DriveState::Normal);
        assert_eq!(session.tracker().progress(CartId(1)).unwrap().current_lap, 1);
        assert_eq!(session.best_times().laps.len(), 1);

        session.reset();
        assert_eq!(session.stats().cart_count, 0);
        assert_eq!(session.stats().ai_driver_count, 0);
    }

    #[test]
    fn test_shuffled_grid_is_deterministic_with_seed() {
        let config = RaceConfig {
            shuffle_grid: true,
            countdown: 0.0,
            ..Default::default()
        };
        let grid = |seed: u64| {
            let mut session = RaceSession::new(config.clone()).unwrap();
            for id in 1..=6 {
                session.register_cart(Cart::new(id, format!("Cart {}", id)));
            }
            session.start_race_with_rng(&mut StdRng::seed_from_u64(seed));
            session.leaderboard()
        };

        assert_eq!(grid(42), grid(42));
        assert_eq!(grid(42).len(), 6);
    }

    #[test]
    fn test_init_race_keeps_best_times() {
        let mut session = session(0.0);
        let mut times = BestTimes::new(10);
        times.record_lap("Mario", 30.0);
        session.set_best_times(times);
        session.register_cart(Cart::new(1, "Mario"));

        let config = RaceConfig {
            checkpoint_count: 5,
            best_times_capacity: 4,
            ..Default::default()
        };
        session.init_race(config).unwrap();

        assert_eq!(session.stats().cart_count, 0);
        assert_eq!(session.tracker().checkpoint_count(), 5);
        assert_eq!(session.best_times().capacity, 4);
        assert_eq!(session.best_times().laps.len(), 1);
    }

    #[test]
    fn test_init_race_keeps_race_observers() {
        let laps = std::rc::Rc::new(std::cell::RefCell::new(0));
        let mut session = session(0.0);
        let counter = std::rc::Rc::clone(&laps);
        session.race_events().subscribe(move |e| {
            if matches!(e, RaceEvent::LapCompleted { .. }) {
                *counter.borrow_mut() += 1;
            }
        });

        let config = RaceConfig {
            checkpoint_count: 2,
            countdown: 0.0,
            ..Default::default()
        };
        session.init_race(config).unwrap();
        assert_eq!(session.race_events().listener_count(), 1);

        session.register_cart(Cart::new(1, "Mario"));
        session.start_race();
        for checkpoint in [0, 1, 0] {
            session.push(SessionInput::CheckpointPassed {
                cart: CartId(1),
                checkpoint,
            });
        }
        session.tick(0.1);

        assert_eq!(*laps.borrow(), 1);
    }
}
