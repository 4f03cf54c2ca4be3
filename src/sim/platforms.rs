//! Procedural platform generation
//!
//! The live platforms form an x-sorted, non-overlapping sequence. New
//! platforms are appended at the back as the player advances and old ones
//! are retired from the front, so the container is a plain `VecDeque`.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, in_landing_envelope};
use super::state::{Platform, PlatformId};
use crate::random_between;
use crate::tuning::{DifficultyClass, Tuning};

/// Live platforms around the player
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformField {
    platforms: VecDeque<Platform>,
    /// Next platform id
    next_id: PlatformId,
}

impl PlatformField {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the field and seed the spawn platform plus one more.
    ///
    /// Returns the ids of generated platforms (not the spawn platform) so
    /// the caller can offer them to the power-up director.
    pub fn reset<R: Rng>(&mut self, tuning: &Tuning, rng: &mut R) -> Vec<PlatformId> {
        self.platforms.clear();
        self.next_id = 0;

        let width = random_between(rng, tuning.min_platform_width, tuning.max_platform_width);
        let start = Platform {
            id: self.allocate_id(),
            x: tuning.game_width / 2.0 - width / 2.0,
            y: tuning.start_platform_y(),
            width,
            class: DifficultyClass::Easy,
            has_power_up: false,
        };
        self.platforms.push_back(start);

        vec![self.push_next(tuning, rng)]
    }

    fn allocate_id(&mut self) -> PlatformId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Build the platform that follows `last`
    pub fn generate_next<R: Rng>(
        &mut self,
        last: &Platform,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Platform {
        let width = random_between(rng, tuning.min_platform_width, tuning.max_platform_width);

        let class = tuning.classes.pick(rng.random::<f32>());
        let rule = tuning.classes.rule(class);
        let distance = random_between(rng, rule.distance.min, rule.distance.max);
        let height_change = random_between(rng, rule.height.min, rule.height.max);

        let x = last.x + distance + width / 2.0 + last.width / 2.0;
        let y = (last.y + height_change).clamp(tuning.min_platform_y(), tuning.max_platform_y());

        Platform {
            id: self.allocate_id(),
            x,
            y,
            width,
            class,
            has_power_up: false,
        }
    }

    /// Generate after the current last platform and append it
    fn push_next<R: Rng>(&mut self, tuning: &Tuning, rng: &mut R) -> PlatformId {
        let last = self
            .platforms
            .back()
            .cloned()
            .unwrap_or_else(|| Platform {
                id: 0,
                x: 0.0,
                y: tuning.start_platform_y(),
                width: 0.0,
                class: DifficultyClass::Easy,
                has_power_up: false,
            });
        let platform = self.generate_next(&last, tuning, rng);
        let id = platform.id;
        log::trace!(
            "Platform {} ({}) at x={:.0} y={:.0} w={:.0}",
            id,
            platform.class.as_str(),
            platform.x,
            platform.y,
            platform.width
        );
        self.platforms.push_back(platform);
        id
    }

    /// Retire platforms behind the player and fill the look-ahead.
    ///
    /// Returns the ids of newly generated platforms in creation order.
    pub fn advance_window<R: Rng>(
        &mut self,
        player_x: f32,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Vec<PlatformId> {
        let behind = player_x - tuning.trailing_margin;
        self.retire_behind(behind);

        let mut created = Vec::new();
        while self
            .platforms
            .back()
            .is_none_or(|last| last.x < player_x + tuning.look_ahead_margin)
        {
            created.push(self.push_next(tuning, rng));
        }

        // A single long step can leave the old tail stranded behind the window
        self.retire_behind(behind);
        created
    }

    /// Drop platforms whose right edge is at or behind `behind_x`, keeping
    /// at least one so generation always has something to follow.
    fn retire_behind(&mut self, behind_x: f32) {
        while self.platforms.len() > 1
            && self
                .platforms
                .front()
                .is_some_and(|p| p.right() <= behind_x)
        {
            if let Some(p) = self.platforms.pop_front() {
                log::trace!("Platform {} retired", p.id);
            }
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Platform> {
        self.platforms.iter()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }

    pub fn first(&self) -> Option<&Platform> {
        self.platforms.front()
    }

    pub fn last(&self) -> Option<&Platform> {
        self.platforms.back()
    }

    pub fn get(&self, id: PlatformId) -> Option<&Platform> {
        self.index_of(id).map(|i| &self.platforms[i])
    }

    pub fn get_mut(&mut self, id: PlatformId) -> Option<&mut Platform> {
        self.index_of(id).map(move |i| &mut self.platforms[i])
    }

    /// Ids increase along the sequence, so a binary search finds them
    fn index_of(&self, id: PlatformId) -> Option<usize> {
        self.platforms.binary_search_by_key(&id, |p| p.id).ok()
    }

    /// Platform whose `[x, x + width)` span contains `x`
    pub fn platform_under(&self, x: f32) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.contains_x(x))
    }

    /// First platform with the player box inside its landing envelope
    pub fn landing_platform(&self, player: &Aabb) -> Option<&Platform> {
        self.platforms.iter().find(|p| in_landing_envelope(player, p))
    }

    /// Number of live platforms strictly to the right of `x`
    pub fn count_beyond(&self, x: f32) -> usize {
        self.platforms.iter().filter(|p| p.x > x).count()
    }

    #[cfg(test)]
    pub(crate) fn push_for_test(&mut self, platform: Platform) {
        self.next_id = self.next_id.max(platform.id + 1);
        self.platforms.push_back(platform);
    }

    #[cfg(test)]
    pub(crate) fn clear_for_test(&mut self) {
        self.platforms.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn assert_sequence_invariants(field: &PlatformField, tuning: &Tuning) {
        let platforms: Vec<_> = field.iter().collect();
        for p in &platforms {
            assert!(p.width >= tuning.min_platform_width && p.width <= tuning.max_platform_width);
            assert!(p.y >= tuning.min_platform_y() - 0.001);
            assert!(p.y <= tuning.max_platform_y() + 0.001);
        }
        for pair in platforms.windows(2) {
            assert!(pair[1].id > pair[0].id, "ids must increase");
            assert!(pair[1].x > pair[0].x, "x must increase");
            assert!(pair[1].x > pair[0].right(), "platforms must not overlap");
        }
    }

    #[test]
    fn test_reset_seeds_centered_easy_platform() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut field = PlatformField::new();
        let created = field.reset(&tuning, &mut rng);

        assert_eq!(field.len(), 2);
        assert_eq!(created, vec![1]);
        let first = field.first().unwrap();
        assert_eq!(first.id, 0);
        assert_eq!(first.class, DifficultyClass::Easy);
        assert!((first.center_x() - tuning.game_width / 2.0).abs() < 0.001);
        assert!((first.y - tuning.start_platform_y()).abs() < 0.001);
        assert_sequence_invariants(&field, &tuning);
    }

    #[test]
    fn test_generate_next_spacing_follows_class() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(42);
        let mut field = PlatformField::new();
        field.reset(&tuning, &mut rng);

        let mut last = field.last().cloned().unwrap();
        for _ in 0..500 {
            let next = field.generate_next(&last, &tuning, &mut rng);
            let rule = tuning.classes.rule(next.class);
            let distance = next.x - last.x - next.width / 2.0 - last.width / 2.0;
            assert!(distance >= rule.distance.min - 0.01 && distance <= rule.distance.max + 0.01);
            assert!(next.id > last.id);
            last = next;
        }
    }

    #[test]
    fn test_class_distribution_roughly_matches_weights() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut field = PlatformField::new();
        field.reset(&tuning, &mut rng);
        let mut last = field.last().cloned().unwrap();

        let mut counts = [0u32; 3];
        let n = 10_000;
        for _ in 0..n {
            let next = field.generate_next(&last, &tuning, &mut rng);
            let idx = DifficultyClass::ALL.iter().position(|c| *c == next.class).unwrap();
            counts[idx] += 1;
            last = next;
        }
        let frac = |c: u32| c as f32 / n as f32;
        assert!((frac(counts[0]) - 0.5).abs() < 0.03);
        assert!((frac(counts[1]) - 0.3).abs() < 0.03);
        assert!((frac(counts[2]) - 0.2).abs() < 0.03);
    }

    #[test]
    fn test_advance_window_fills_look_ahead() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut field = PlatformField::new();
        field.reset(&tuning, &mut rng);

        let created = field.advance_window(325.0, &tuning, &mut rng);
        assert!(!created.is_empty());
        assert!(field.last().unwrap().x >= 325.0 + tuning.look_ahead_margin);
        // Created ids are the tail of the sequence, in order
        let tail: Vec<_> = field.iter().rev().take(created.len()).map(|p| p.id).collect();
        let mut expected = created.clone();
        expected.reverse();
        assert_eq!(tail, expected);
    }

    #[test]
    fn test_advance_window_is_idempotent_without_movement() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(9);
        let mut field = PlatformField::new();
        field.reset(&tuning, &mut rng);
        field.advance_window(500.0, &tuning, &mut rng);
        let before: Vec<_> = field.iter().map(|p| p.id).collect();

        let created = field.advance_window(500.0, &tuning, &mut rng);
        assert!(created.is_empty());
        let after: Vec<_> = field.iter().map(|p| p.id).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_lookups() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut field = PlatformField::new();
        field.reset(&tuning, &mut rng);
        field.advance_window(0.0, &tuning, &mut rng);

        let second = field.iter().nth(1).cloned().unwrap();
        assert_eq!(field.get(second.id), Some(&second));
        assert!(field.get(10_000).is_none());

        field.get_mut(second.id).unwrap().has_power_up = true;
        assert!(field.get(second.id).unwrap().has_power_up);

        assert_eq!(field.platform_under(second.x + 1.0).map(|p| p.id), Some(second.id));
        assert!(field.platform_under(second.right()).is_none_or(|p| p.id != second.id));
        assert_eq!(field.count_beyond(second.x), field.len() - 2);
    }

    #[test]
    fn test_ids_restart_on_reset() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut field = PlatformField::new();
        field.reset(&tuning, &mut rng);
        field.advance_window(5_000.0, &tuning, &mut rng);
        assert!(field.last().unwrap().id > 10);

        field.reset(&tuning, &mut rng);
        let ids: Vec<_> = field.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![0, 1]);
    }

    proptest! {
        #[test]
        fn prop_sequence_stays_sorted_and_bounded(seed in any::<u64>(), steps in 1usize..60) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut field = PlatformField::new();
            field.reset(&tuning, &mut rng);

            let mut player_x = 300.0f32;
            for _ in 0..steps {
                player_x += 150.0;
                field.advance_window(player_x, &tuning, &mut rng);
                assert_sequence_invariants(&field, &tuning);
            }
        }

        #[test]
        fn prop_window_invariant(seed in any::<u64>(), jumps in prop::collection::vec(0.0f32..3_000.0, 1..20)) {
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut field = PlatformField::new();
            field.reset(&tuning, &mut rng);

            let mut player_x = 0.0f32;
            for jump in jumps {
                player_x += jump;
                field.advance_window(player_x, &tuning, &mut rng);

                for p in field.iter() {
                    prop_assert!(p.right() >= player_x - tuning.trailing_margin);
                }
                prop_assert!(field.last().unwrap().x >= player_x + tuning.look_ahead_margin);
            }
        }
    }
}
