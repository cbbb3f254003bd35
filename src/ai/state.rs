//! Drive states and the legal transition table

use serde::{Deserialize, Serialize};

/// Behavioral mode of an AI-controlled cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DriveState {
    #[default]
    Normal,
    SpinningOut,
    Recovering,
    Boosting,
    Stunned,
}

impl DriveState {
    pub const ALL: [DriveState; 5] = [
        DriveState::Normal,
        DriveState::SpinningOut,
        DriveState::Recovering,
        DriveState::Boosting,
        DriveState::Stunned,
    ];

    /// Whether `to` may follow `self`
    pub fn can_transition_to(self, to: DriveState) -> bool {
        match self {
            DriveState::Normal => true,
            DriveState::SpinningOut => to == DriveState::Recovering,
            DriveState::Recovering => matches!(to, DriveState::Normal | DriveState::SpinningOut),
            DriveState::Boosting => to != DriveState::Recovering,
            DriveState::Stunned => to == DriveState::Normal,
        }
    }

    /// State entered automatically once a timed state runs out
    pub fn successor(self) -> Option<DriveState> {
        match self {
            DriveState::Normal => None,
            DriveState::SpinningOut => Some(DriveState::Recovering),
            DriveState::Recovering => Some(DriveState::Normal),
            DriveState::Boosting => Some(DriveState::Normal),
            DriveState::Stunned => Some(DriveState::Normal),
        }
    }

    pub fn is_timed(self) -> bool {
        self != DriveState::Normal
    }

    pub fn allows_movement(self) -> bool {
        !matches!(self, DriveState::Stunned | DriveState::SpinningOut)
    }

    pub fn allows_items(self) -> bool {
        matches!(self, DriveState::Normal | DriveState::Boosting)
    }
}
