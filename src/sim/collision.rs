//! Axis-aligned box overlap tests
//!
//! Every entity in the sim is a rectangle; collision is a strict AABB
//! overlap on all four sides. Touching edges do not count, which keeps
//! "grazing" passes harmless and makes the resolution order in `tick`
//! easy to reason about.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box, anchored at its top-left corner
/// (screen coordinates: y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Strict overlap: shared edges or corners are a miss
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }

    /// Center point, used for particle bursts
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}
