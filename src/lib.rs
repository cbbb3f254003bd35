//! Kart Race Core
//!
//! Race progress tracking and AI driver state for a kart racing game. The
//! host engine calls into a [`RaceSession`] from its update loop: checkpoint
//! triggers, spline positions and item hits go in, standings, lap and finish
//! notifications and drive state changes come out.

pub mod ai;
pub mod best_times;
pub mod cart;
pub mod config;
pub mod error;
pub mod events;
pub mod race;
pub mod session;

pub use ai::{AiDriveStateMachine, DriveEffects, DriveState, NoEffects};
pub use best_times::{BestTimeEntry, BestTimes};
pub use cart::{Cart, CartId};
pub use config::{AiConfig, RaceConfig};
pub use error::{ConfigError, TransitionError};
pub use events::{DriveEvent, EventChannel, RaceEvent, SubscriptionId};
pub use race::{RaceProgress, RaceResult, RaceTracker};
pub use session::{
    CartSnapshot, RaceSession, RaceSnapshot, RaceStatus, SessionInput, SessionStats, TickReport,
};
