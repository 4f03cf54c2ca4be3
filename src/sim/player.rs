//! Player physics and state machine
//!
//! Transitions:
//!
//! | from            | trigger        | to     |
//! |-----------------|----------------|--------|
//! | Stand           | charge start   | Charge |
//! | Charge          | charge release | Jump   |
//! | Jump            | apex passed    | Fall   |
//! | any but Flying  | power-up       | Flying |
//! | Flying          | quota met      | Fall   |
//! | Fall            | land           | Stand  |
//!
//! Anything else is a no-op. Landing and flight are driven from `tick`;
//! the player never decides on its own that it has touched down.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::state::Platform;
use crate::consts::*;

/// Player state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    #[default]
    Stand,
    /// Holding the jump input since `started_at_ms`
    Charge { started_at_ms: u64 },
    /// Rising
    Jump,
    /// Past the apex
    Fall,
    /// Gravity-free flight, position driven by the coordinator
    Flying,
}

/// Velocity for a charge held `charge_ms` milliseconds.
///
/// The curve is superlinear in hold time and capped per axis.
pub fn jump_velocity(charge_ms: u64) -> Vec2 {
    let charge_time = charge_ms.min(MAX_CHARGE_MS) as f32;
    let charge_percent = charge_time / MAX_CHARGE_MS as f32;
    let power = charge_time * JUMP_COEF;
    let multiplier = charge_percent.powf(CHARGE_CURVE_EXPONENT);

    Vec2::new(
        (power * 10.0 * multiplier).min(MAX_HORIZONTAL_SPEED),
        -(power * 12.0 * multiplier).min(MAX_VERTICAL_SPEED),
    )
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the bounding box
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: PlayerState,
    pub facing_right: bool,
    /// Cosmetic animation frame, 0..ANIMATION_FRAMES
    pub animation_frame: u32,
    animation_timer: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            state: PlayerState::Stand,
            facing_right: true,
            animation_frame: 0,
            animation_timer: 0,
        }
    }
}

impl Player {
    /// A standing player centered on `platform`
    pub fn standing_on(platform: &Platform) -> Self {
        let mut player = Self::default();
        player.snap_onto(platform);
        player
    }

    fn snap_onto(&mut self, platform: &Platform) {
        self.pos = Vec2::new(
            platform.center_x() - PLAYER_SIZE / 2.0,
            platform.y - PLAYER_SIZE,
        );
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, Vec2::splat(PLAYER_SIZE))
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + PLAYER_SIZE / 2.0
    }

    pub fn feet_y(&self) -> f32 {
        self.pos.y + PLAYER_SIZE
    }

    /// Begin charging. Ignored unless standing.
    pub fn start_charge(&mut self, now_ms: u64) -> bool {
        if self.state != PlayerState::Stand {
            return false;
        }
        self.state = PlayerState::Charge {
            started_at_ms: now_ms,
        };
        self.vel = Vec2::ZERO;
        true
    }

    /// Release the charge and jump. Ignored unless charging.
    pub fn end_charge(&mut self, now_ms: u64) -> Option<Vec2> {
        let PlayerState::Charge { started_at_ms } = self.state else {
            return None;
        };
        self.vel = jump_velocity(now_ms.saturating_sub(started_at_ms));
        self.state = PlayerState::Jump;
        self.facing_right = true;
        Some(self.vel)
    }

    /// Charge bar fill in [0, 1] (0 when not charging)
    pub fn charge_percent(&self, now_ms: u64) -> f32 {
        match self.state {
            PlayerState::Charge { started_at_ms } => {
                let held = now_ms.saturating_sub(started_at_ms).min(MAX_CHARGE_MS);
                held as f32 / MAX_CHARGE_MS as f32
            }
            _ => 0.0,
        }
    }

    /// Enter flight. Ignored if already flying.
    pub fn start_flying(&mut self) -> bool {
        if self.state == PlayerState::Flying {
            return false;
        }
        self.state = PlayerState::Flying;
        self.vel = Vec2::ZERO;
        true
    }

    /// Leave flight and start falling. Ignored unless flying.
    pub fn stop_flying(&mut self) -> bool {
        if self.state != PlayerState::Flying {
            return false;
        }
        self.state = PlayerState::Fall;
        self.vel = Vec2::ZERO;
        true
    }

    /// Touch down on `platform`: stand centered on top of it
    pub fn land(&mut self, platform: &Platform) {
        self.state = PlayerState::Stand;
        self.vel = Vec2::ZERO;
        self.snap_onto(platform);
    }

    /// Advance one tick
    pub fn update(&mut self, gravity: f32) {
        self.animation_timer += 1;
        if self.animation_timer >= ANIMATION_TICKS_PER_FRAME {
            self.animation_timer = 0;
            self.animation_frame = (self.animation_frame + 1) % ANIMATION_FRAMES;
        }

        match self.state {
            PlayerState::Flying => {}
            PlayerState::Stand | PlayerState::Charge { .. } => {
                self.vel = Vec2::ZERO;
            }
            PlayerState::Jump | PlayerState::Fall => {
                self.vel.x *= AIR_RESISTANCE;
                self.vel.x = self.vel.x.clamp(-MAX_HORIZONTAL_SPEED, MAX_HORIZONTAL_SPEED);
                self.vel.y = self.vel.y.clamp(-MAX_VERTICAL_SPEED, MAX_VERTICAL_SPEED);

                self.pos += self.vel;
                self.vel.y += gravity;
                if self.vel.y > 0.0 {
                    self.state = PlayerState::Fall;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::DifficultyClass;
    use proptest::prelude::*;

    const GRAVITY: f32 = 0.4;

    fn platform(x: f32, y: f32, width: f32) -> Platform {
        Platform {
            id: 0,
            x,
            y,
            width,
            class: DifficultyClass::Easy,
            has_power_up: false,
        }
    }

    #[derive(Debug, Clone, Copy)]
    enum Trigger {
        ChargeStart,
        ChargeEnd,
        StartFlying,
        StopFlying,
    }

    fn apply(player: &mut Player, trigger: Trigger) {
        match trigger {
            Trigger::ChargeStart => {
                player.start_charge(100);
            }
            Trigger::ChargeEnd => {
                player.end_charge(900);
            }
            Trigger::StartFlying => {
                player.start_flying();
            }
            Trigger::StopFlying => {
                player.stop_flying();
            }
        }
    }

    #[test]
    fn test_transition_table() {
        use PlayerState::*;
        use Trigger::*;

        let charging = Charge { started_at_ms: 0 };
        let table = [
            (Stand, ChargeStart, Charge { started_at_ms: 100 }),
            (Stand, ChargeEnd, Stand),
            (Stand, StartFlying, Flying),
            (Stand, StopFlying, Stand),
            (charging, ChargeStart, charging),
            (charging, ChargeEnd, Jump),
            (charging, StartFlying, Flying),
            (charging, StopFlying, charging),
            (Jump, ChargeStart, Jump),
            (Jump, ChargeEnd, Jump),
            (Jump, StartFlying, Flying),
            (Jump, StopFlying, Jump),
            (Fall, ChargeStart, Fall),
            (Fall, ChargeEnd, Fall),
            (Fall, StartFlying, Flying),
            (Fall, StopFlying, Fall),
            (Flying, ChargeStart, Flying),
            (Flying, ChargeEnd, Flying),
            (Flying, StartFlying, Flying),
            (Flying, StopFlying, Fall),
        ];

        for (from, trigger, to) in table {
            let mut player = Player {
                state: from,
                ..Default::default()
            };
            apply(&mut player, trigger);
            assert_eq!(player.state, to, "{:?} --{:?}-->", from, trigger);
        }
    }

    #[test]
    fn test_charge_release_scenario() {
        let mut player = Player::standing_on(&platform(300.0, 800.0, 150.0));
        assert!(player.start_charge(0));
        let vel = player.end_charge(800).unwrap();

        assert_eq!(player.state, PlayerState::Jump);
        assert!(player.facing_right);
        // 800ms: percent 0.533, multiplier 0.533^1.2 ~ 0.470
        let multiplier = (800.0f32 / 1500.0).powf(1.2);
        assert!((vel.x - 2.4 * 10.0 * multiplier).abs() < 0.001);
        assert!((vel.y + 2.4 * 12.0 * multiplier).abs() < 0.001);
        assert!(vel.x > 11.0 && vel.x < MAX_HORIZONTAL_SPEED);
        assert!(vel.y < -13.0 && vel.y > -MAX_VERTICAL_SPEED);
    }

    #[test]
    fn test_full_charge_hits_caps() {
        assert_eq!(jump_velocity(1500), Vec2::new(12.0, -15.0));
        assert_eq!(jump_velocity(60_000), Vec2::new(12.0, -15.0));
        assert_eq!(jump_velocity(0), Vec2::ZERO);
    }

    #[test]
    fn test_release_before_start_time_is_zero_charge() {
        let mut player = Player::default();
        player.start_charge(500);
        assert_eq!(player.end_charge(100), Some(Vec2::ZERO));
    }

    #[test]
    fn test_charge_percent() {
        let mut player = Player::default();
        assert_eq!(player.charge_percent(1000), 0.0);
        player.start_charge(1000);
        assert!((player.charge_percent(1750) - 0.5).abs() < 0.0001);
        assert_eq!(player.charge_percent(9000), 1.0);
    }

    #[test]
    fn test_standing_velocity_pinned() {
        let mut player = Player {
            vel: Vec2::new(3.0, 3.0),
            ..Default::default()
        };
        player.update(GRAVITY);
        assert_eq!(player.vel, Vec2::ZERO);
        assert_eq!(player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_airborne_tick_order() {
        let mut player = Player {
            vel: Vec2::new(10.0, -1.0),
            state: PlayerState::Jump,
            ..Default::default()
        };
        player.update(GRAVITY);

        // Drag first, then move, then gravity
        assert!((player.pos.x - 9.9).abs() < 0.0001);
        assert!((player.pos.y + 1.0).abs() < 0.0001);
        assert!((player.vel.y + 0.6).abs() < 0.0001);
        assert_eq!(player.state, PlayerState::Jump);

        player.update(GRAVITY);
        player.update(GRAVITY);
        // vy: -0.6 -> -0.2 -> 0.2
        assert_eq!(player.state, PlayerState::Fall);
    }

    #[test]
    fn test_airborne_speed_clamped() {
        let mut player = Player {
            vel: Vec2::new(-40.0, 40.0),
            state: PlayerState::Fall,
            ..Default::default()
        };
        player.update(GRAVITY);
        assert!((player.pos.x + MAX_HORIZONTAL_SPEED).abs() < 0.0001);
        assert!((player.pos.y - MAX_VERTICAL_SPEED).abs() < 0.0001);
    }

    #[test]
    fn test_flying_ignores_physics() {
        let mut player = Player {
            pos: Vec2::new(50.0, 60.0),
            state: PlayerState::Fall,
            vel: Vec2::new(5.0, 5.0),
            ..Default::default()
        };
        assert!(player.start_flying());
        assert_eq!(player.vel, Vec2::ZERO);
        for _ in 0..10 {
            player.update(GRAVITY);
        }
        assert_eq!(player.pos, Vec2::new(50.0, 60.0));

        assert!(player.stop_flying());
        assert_eq!(player.state, PlayerState::Fall);
        assert_eq!(player.vel, Vec2::ZERO);
        player.update(GRAVITY);
        assert!(player.vel.y > 0.0);
    }

    #[test]
    fn test_land_snaps_centered_on_top() {
        let p = platform(1000.0, 600.0, 160.0);
        let mut player = Player {
            pos: Vec2::new(1010.0, 512.0),
            vel: Vec2::new(4.0, 7.0),
            state: PlayerState::Fall,
            ..Default::default()
        };
        player.land(&p);
        assert_eq!(player.state, PlayerState::Stand);
        assert_eq!(player.vel, Vec2::ZERO);
        assert!((player.center_x() - p.center_x()).abs() < 0.001);
        assert!((player.feet_y() - p.y).abs() < 0.001);
    }

    #[test]
    fn test_animation_cycles_independently() {
        let mut player = Player::default();
        for _ in 0..(ANIMATION_TICKS_PER_FRAME * ANIMATION_FRAMES) {
            player.update(GRAVITY);
        }
        assert_eq!(player.animation_frame, 0);
        for _ in 0..ANIMATION_TICKS_PER_FRAME {
            player.update(GRAVITY);
        }
        assert_eq!(player.animation_frame, 1);
        assert_eq!(player.state, PlayerState::Stand);
    }

    proptest! {
        #[test]
        fn prop_charge_curve_monotonic_and_capped(a in 0u64..=MAX_CHARGE_MS, b in 0u64..=MAX_CHARGE_MS) {
            let (t1, t2) = if a <= b { (a, b) } else { (b, a) };
            let v1 = jump_velocity(t1);
            let v2 = jump_velocity(t2);
            prop_assert!(v1.x.abs() <= v2.x.abs());
            prop_assert!(v1.y.abs() <= v2.y.abs());
            prop_assert!(v2.x.abs() <= MAX_HORIZONTAL_SPEED);
            prop_assert!(v2.y.abs() <= MAX_VERTICAL_SPEED);
        }
    }
}
