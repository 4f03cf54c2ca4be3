//! Game state and core simulation types
//!
//! One `GameState` value owns everything a run touches and is threaded
//! through `tick`; nothing in the simulation is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::platforms::PlatformField;
use super::player::Player;
use super::powerup::PowerUpDirector;
use crate::consts::*;
use crate::tuning::{DifficultyClass, Tuning};

/// Platform identifier, strictly increasing within a run
pub type PlatformId = u32;

/// A cloud platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    /// Left edge
    pub x: f32,
    /// Top surface
    pub y: f32,
    pub width: f32,
    pub class: DifficultyClass,
    /// Set while an uncollected collectible is anchored here
    pub has_power_up: bool,
}

impl Platform {
    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Half-open containment test on `[x, x + width)`
    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x < self.right()
    }
}

/// A flight power-up floating above a platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    /// Platform this collectible was spawned on
    pub platform_id: PlatformId,
    /// Top-left corner
    pub pos: Vec2,
    pub collected: bool,
}

impl Collectible {
    /// Centered on the platform, floating above its top
    pub fn above(platform: &Platform) -> Self {
        Self {
            platform_id: platform.id,
            pos: Vec2::new(
                platform.center_x() - COLLECTIBLE_SIZE / 2.0,
                platform.y - COLLECTIBLE_LIFT - COLLECTIBLE_SIZE,
            ),
            collected: false,
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_pos_size(self.pos, Vec2::splat(COLLECTIBLE_SIZE))
    }

    /// Enlarged hit box used for pickups
    pub fn pickup_bounds(&self) -> Aabb {
        self.bounds().expand(COLLECTIBLE_PICKUP_MARGIN)
    }

    pub fn center_x(&self) -> f32 {
        self.pos.x + COLLECTIBLE_SIZE / 2.0
    }
}

/// Platform the player took off from when flight began
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlightAnchor {
    pub platform_id: PlatformId,
    pub x: f32,
    pub y: f32,
}

impl FlightAnchor {
    pub fn from_platform(platform: &Platform) -> Self {
        Self {
            platform_id: platform.id,
            x: platform.x,
            y: platform.y,
        }
    }

    /// Height the player is held at while flying
    pub fn flight_y(&self) -> f32 {
        self.y - FLIGHT_HEIGHT
    }
}

/// Active flight mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub anchor: FlightAnchor,
    /// Platforms beyond the anchor required to end the flight
    pub quota: u32,
    /// Platforms beyond the anchor counted on the last tick
    pub passed: u32,
}

/// Per-run counters, reset atomically on run start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub score: u64,
    /// Landings since the run began
    pub combo: u32,
    pub game_over: bool,
    pub flight: Option<Flight>,
}

impl RunState {
    pub fn flight_mode(&self) -> bool {
        self.flight.is_some()
    }

    /// Quota of the active flight, 0 when not flying.
    ///
    /// This is the fixed quota set at pickup, not a countdown; progress is
    /// in `Flight::passed`.
    pub fn flight_platforms_remaining(&self) -> u32 {
        self.flight.map(|f| f.quota).unwrap_or(0)
    }
}

/// Notable things that happened during a tick, for audio/effects hooks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Charge released
    Jumped { vel: Vec2 },
    /// Touched down on a platform
    Landed { platform_id: PlatformId, combo: u32 },
    /// A collectible was consumed; `flight` is false if no platform was under the player
    PowerUpCollected { flight: bool },
    FlightStarted { anchor_id: PlatformId, quota: u32 },
    FlightEnded,
    /// Fell out of the world
    GameOver { score: u64, new_high_score: bool },
    RunReset,
}

/// Complete game state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) tuning: Tuning,
    pub(crate) rng: Pcg32,
    /// Simulation tick counter for the current run
    pub time_ticks: u64,
    pub run: RunState,
    /// Best score known to this session (loaded by the host)
    pub high_score: u64,
    pub player: Player,
    pub platforms: PlatformField,
    pub powerups: PowerUpDirector,
    /// Events raised since the host last drained them
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game state with the given seed and tuning
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self {
            seed,
            platforms: PlatformField::new(),
            powerups: PowerUpDirector::from_tuning(&tuning),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            run: RunState::default(),
            high_score: 0,
            player: Player::default(),
            events: Vec::new(),
        };
        state.start_run();
        state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Throw away the current run and start a fresh one.
    ///
    /// The RNG keeps running so consecutive runs get different terrain.
    pub fn reset(&mut self) {
        self.start_run();
        self.events.push(GameEvent::RunReset);
        log::info!("Run reset (high score {})", self.high_score);
    }

    fn start_run(&mut self) {
        self.run = RunState::default();
        self.time_ticks = 0;
        self.powerups.reset();

        let seeded = self.platforms.reset(&self.tuning, &mut self.rng);
        self.powerups
            .consider_all(&mut self.platforms, &seeded, &mut self.rng);

        match self.platforms.first() {
            Some(start) => self.player = Player::standing_on(start),
            None => self.player = Player::default(),
        }
    }

    /// Horizontal camera offset for the renderer
    pub fn camera_x(&self) -> f32 {
        (self.player.pos.x - self.tuning.game_width * CAMERA_LEAD).max(0.0)
    }

    /// Live collectibles, for drawing
    pub fn collectibles(&self) -> &[Collectible] {
        self.powerups.collectibles()
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
