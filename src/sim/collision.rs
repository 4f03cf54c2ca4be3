//! Collision tests for axis-aligned boxes
//!
//! Two checks drive gameplay: the forgiving overlap used for collectible
//! pickups, and the one-sided landing envelope that only accepts a player
//! dropping onto the top of a platform.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Platform;
use crate::consts::{LANDING_ABOVE, LANDING_BELOW, LANDING_TOLERANCE_X};

/// Axis-aligned bounding box in world space (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box from a top-left corner and a size
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Grow every side by `margin`
    pub fn expand(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Overlap test; touching edges count as overlapping
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.min.x > other.max.x
            || self.max.x < other.min.x
            || self.min.y > other.max.y
            || self.max.y < other.min.y)
    }
}

/// Whether a player box is in the landing envelope of a platform.
///
/// The horizontal center must be within the platform span widened by
/// `LANDING_TOLERANCE_X` on both sides. The feet must sit in a band from
/// slightly above the platform top to moderately below it. Callers only
/// evaluate this while the player is falling.
pub fn in_landing_envelope(player: &Aabb, platform: &Platform) -> bool {
    let center_x = player.center().x;
    let feet = player.max.y;

    let horizontal = center_x > platform.x - LANDING_TOLERANCE_X
        && center_x < platform.right() + LANDING_TOLERANCE_X;
    let vertical = feet >= platform.y - LANDING_ABOVE && feet <= platform.y + LANDING_BELOW;

    horizontal && vertical
}
