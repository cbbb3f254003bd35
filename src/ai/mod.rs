//! AI Driver Module
//!
//! Owns the transient behavioral mode of AI-controlled carts: spin-outs,
//! recovery, boosts and stuns, each with an autonomous timeout.

pub mod machine;
pub mod state;

pub use machine::{AiDriveStateMachine, DriveEffects, NoEffects};
pub use state::DriveState;
