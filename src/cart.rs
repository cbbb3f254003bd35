//! Cart - External cart identity
//!
//! The core never owns a cart's lifecycle. It only indexes race and
//! driver state by the cart's stable id.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable integer handle of a cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartId(pub u32);

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A cart taking part in the race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Unique cart ID
    pub id: CartId,
    /// Display name
    pub name: String,
}

impl Cart {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: CartId(id),
            name: name.into(),
        }
    }
}
