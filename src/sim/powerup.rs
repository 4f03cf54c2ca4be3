//! Flight power-ups
//!
//! Each freshly generated platform gets one chance to carry a collectible.
//! Touching a collectible hands the coordinator a flight quota.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::platforms::PlatformField;
use super::state::{Collectible, PlatformId};
use crate::tuning::Tuning;

/// Outcome of a pickup check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PickupResult {
    pub collected: bool,
    /// Platforms to pass in flight mode (0 when nothing was collected)
    pub platforms_to_fly: u32,
    /// Platform the consumed collectible was anchored to
    pub platform_id: Option<PlatformId>,
}

/// Spawns, tracks and consumes collectibles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUpDirector {
    collectibles: Vec<Collectible>,
    /// Platform that most recently received a collectible
    last_spawn_platform: Option<PlatformId>,
    spawn_chance: f32,
    spacing_widths: f32,
    platforms_to_fly: u32,
    trailing_margin: f32,
}

impl PowerUpDirector {
    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self {
            collectibles: Vec::new(),
            last_spawn_platform: None,
            spawn_chance: tuning.power_up_chance,
            spacing_widths: tuning.power_up_spacing_widths,
            platforms_to_fly: tuning.platforms_to_fly,
            trailing_margin: tuning.trailing_margin,
        }
    }

    pub fn reset(&mut self) {
        self.collectibles.clear();
        self.last_spawn_platform = None;
    }

    pub fn collectibles(&self) -> &[Collectible] {
        &self.collectibles
    }

    /// Offer a newly generated platform a collectible.
    ///
    /// Returns true if one was spawned. An id that is no longer live is
    /// simply not eligible.
    pub fn consider_spawn<R: Rng>(
        &mut self,
        platforms: &mut PlatformField,
        id: PlatformId,
        rng: &mut R,
    ) -> bool {
        let Some(platform) = platforms.get_mut(id) else {
            log::debug!("Power-up spawn skipped: platform {} is not live", id);
            return false;
        };

        if self.last_spawn_platform == Some(platform.id) || platform.has_power_up {
            return false;
        }

        let center = platform.center_x();
        let window = platform.width * self.spacing_widths;
        let crowded = self
            .collectibles
            .iter()
            .any(|c| !c.collected && (c.center_x() - center).abs() < window);
        if crowded {
            return false;
        }

        if rng.random::<f32>() >= self.spawn_chance {
            return false;
        }

        self.last_spawn_platform = Some(platform.id);
        platform.has_power_up = true;
        self.collectibles.push(Collectible::above(platform));
        log::debug!("Power-up spawned on platform {}", platform.id);
        true
    }

    /// `consider_spawn` for each id, in order
    pub fn consider_all<R: Rng>(
        &mut self,
        platforms: &mut PlatformField,
        ids: &[PlatformId],
        rng: &mut R,
    ) {
        for &id in ids {
            self.consider_spawn(platforms, id, rng);
        }
    }

    /// Consume at most one collectible overlapping the player box
    pub fn check_collisions(&mut self, player: &Aabb) -> PickupResult {
        let hit = self
            .collectibles
            .iter_mut()
            .find(|c| !c.collected && c.pickup_bounds().overlaps(player));

        match hit {
            Some(collectible) => {
                collectible.collected = true;
                PickupResult {
                    collected: true,
                    platforms_to_fly: self.platforms_to_fly,
                    platform_id: Some(collectible.platform_id),
                }
            }
            None => PickupResult::default(),
        }
    }

    /// Drop consumed collectibles and those left behind the player
    pub fn cleanup(&mut self, player_x: f32) {
        let behind = player_x - self.trailing_margin;
        self.collectibles
            .retain(|c| !c.collected && c.pos.x > behind);
    }

    #[cfg(test)]
    pub(crate) fn place_for_test(&mut self, platforms: &mut PlatformField, id: PlatformId) {
        if let Some(platform) = platforms.get_mut(id) {
            platform.has_power_up = true;
            self.collectibles.push(Collectible::above(platform));
            self.last_spawn_platform = Some(id);
        }
    }
}
