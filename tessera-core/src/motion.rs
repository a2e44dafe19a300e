//! Position types shared with the motion layer
//!
//! The motion planner itself lives outside this crate; it calls into the
//! leveling engine with these coordinates when translating commanded moves
//! into machine coordinates and back.

use serde::{Deserialize, Serialize};

/// A point in printer coordinates, millimeters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Create a position
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
