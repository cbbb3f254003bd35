//! AI drive state machine
//!
//! One machine per AI-controlled cart. Item hits and collisions request state
//! changes, the per-frame `advance` times timed states out into their
//! successors. Illegal requests are refused without touching the state.

use crate::ai::state::DriveState;
use crate::cart::CartId;
use crate::config::AiConfig;
use crate::error::TransitionError;
use crate::events::{DriveEvent, EventChannel};
use std::fmt;

/// Slack for rounding in summed frame deltas
const TIMER_EPSILON: f64 = 1e-9;

/// Physics and visual hooks run on state changes and every tick of a timed state.
///
/// Leaving `SpinningOut` or `Recovering` is where collaborators clear residual
/// angular motion; `on_tick` is where forced deceleration is applied.
pub trait DriveEffects {
    fn on_exit(&mut self, _cart: CartId, _state: DriveState) {}

    fn on_enter(&mut self, _cart: CartId, _state: DriveState, _duration: f64) {}

    fn on_tick(&mut self, _cart: CartId, _state: DriveState, _delta: f64) {}
}

/// Effects hook that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl DriveEffects for NoEffects {}

pub struct AiDriveStateMachine {
    cart: CartId,
    state: DriveState,
    /// Elapsed time in the current state (seconds)
    state_timer: f64,
    /// Durations currently in force, overridden by positive request durations
    durations: AiConfig,
    /// Configured defaults restored on reset
    defaults: AiConfig,
    boost_multiplier: f64,
    pending_boost: Option<f64>,
    effects: Box<dyn DriveEffects>,
    events: EventChannel<DriveEvent>,
}

impl AiDriveStateMachine {
    pub fn new(cart: CartId, config: &AiConfig) -> Self {
        Self {
            cart,
            state: DriveState::Normal,
            state_timer: 0.0,
            durations: config.clone(),
            defaults: config.clone(),
            boost_multiplier: 1.0,
            pending_boost: None,
            effects: Box::new(NoEffects),
            events: EventChannel::new(),
        }
    }

    pub fn set_effects(&mut self, effects: impl DriveEffects + 'static) {
        self.effects = Box::new(effects);
    }

    /// State-changed observers
    pub fn events(&mut self) -> &mut EventChannel<DriveEvent> {
        &mut self.events
    }

    pub fn cart(&self) -> CartId {
        self.cart
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn state_timer(&self) -> f64 {
        self.state_timer
    }

    /// Duration currently configured for a state, 0 for Normal
    pub fn state_duration(&self, state: DriveState) -> f64 {
        self.durations.duration_for(state).unwrap_or(0.0)
    }

    /// Time left before the current timed state runs out
    pub fn time_remaining(&self) -> Option<f64> {
        self.durations
            .duration_for(self.state)
            .map(|d| (d - self.state_timer).max(0.0))
    }

    /// Speed factor to apply to the cart, the boost multiplier while boosting
    pub fn speed_multiplier(&self) -> f64 {
        if self.state == DriveState::Boosting {
            self.boost_multiplier
        } else {
            1.0
        }
    }

    pub fn can_move(&self) -> bool {
        self.state.allows_movement()
    }

    pub fn can_use_items(&self) -> bool {
        self.state.allows_items()
    }

    /// Switch to `new_state` if the transition table allows it.
    ///
    /// A positive `duration` replaces the configured duration for that state
    /// and stays in force for later entries.
    pub fn try_change_state(
        &mut self,
        new_state: DriveState,
        duration: f64,
    ) -> Result<(), TransitionError> {
        let old_state = self.state;
        if !old_state.can_transition_to(new_state) {
            log::debug!(
                "Cart {} refused drive state change {:?} -> {:?}",
                self.cart,
                old_state,
                new_state
            );
            return Err(TransitionError {
                from: old_state,
                to: new_state,
            });
        }

        self.exit_state(old_state);

        self.state = new_state;
        self.state_timer = 0.0;
        if duration > 0.0 {
            self.set_duration(new_state, duration);
        }

        self.enter_state(new_state);

        self.events.emit(&DriveEvent::StateChanged {
            cart: self.cart,
            old: old_state,
            new: new_state,
        });
        Ok(())
    }

    /// Enter Boosting with an explicit speed multiplier
    pub fn request_boost(&mut self, duration: f64, multiplier: f64) -> Result<(), TransitionError> {
        if multiplier > 0.0 {
            self.pending_boost = Some(multiplier);
        }
        let result = self.try_change_state(DriveState::Boosting, duration);
        self.pending_boost = None;
        result
    }

    /// Advance the state timer and time out into the successor state
    pub fn advance(&mut self, delta: f64) {
        if !(delta >= 0.0) {
            return;
        }
        self.state_timer += delta;

        let state = self.state;
        let Some(next) = state.successor() else {
            return;
        };

        self.effects.on_tick(self.cart, state, delta);

        if self.state_timer + TIMER_EPSILON >= self.state_duration(state) {
            if let Err(e) = self.try_change_state(next, 0.0) {
                log::warn!("Cart {} could not time out: {}", self.cart, e);
            }
        }
    }

    /// Back to Normal with configured durations, used when the race restarts
    pub fn reset(&mut self) {
        let old_state = self.state;
        if old_state != DriveState::Normal {
            self.exit_state(old_state);
        }

        self.state = DriveState::Normal;
        self.state_timer = 0.0;
        self.durations = self.defaults.clone();
        self.boost_multiplier = 1.0;
        self.pending_boost = None;

        if old_state != DriveState::Normal {
            self.events.emit(&DriveEvent::StateChanged {
                cart: self.cart,
                old: old_state,
                new: DriveState::Normal,
            });
        }
    }

    fn exit_state(&mut self, state: DriveState) {
        if state == DriveState::Boosting {
            self.boost_multiplier = 1.0;
        }
        self.effects.on_exit(self.cart, state);
    }

    fn enter_state(&mut self, state: DriveState) {
        if state == DriveState::Boosting {
            self.boost_multiplier = self
                .pending_boost
                .take()
                .unwrap_or(self.defaults.boost_multiplier);
        }
        let duration = self.state_duration(state);
        self.effects.on_enter(self.cart, state, duration);
    }

    fn set_duration(&mut self, state: DriveState, duration: f64) {
        match state {
            DriveState::Normal => {}
            DriveState::SpinningOut => self.durations.spin_out_duration = duration,
            DriveState::Recovering => self.durations.recovering_duration = duration,
            DriveState::Boosting => self.durations.boost_duration = duration,
            DriveState::Stunned => self.durations.stun_duration = duration,
        }
    }
}

impl fmt::Debug for AiDriveStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiDriveStateMachine")
            .field("cart", &self.cart)
            .field("state", &self.state)
            .field("state_timer", &self.state_timer)
            .field("durations", &self.durations)
            .field("boost_multiplier", &self.boost_multiplier)
            .finish()
    }
}
