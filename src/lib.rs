//! Cloud Hop - a charge-and-jump cloud platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, platforms, power-ups)
//! - `tuning`: Data-driven world and platform balance
//! - `session`: Input queue, clock and high score wiring around the sim
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Key-value storage backends

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod sim;
pub mod tuning;

pub use highscores::HighScore;
pub use session::Session;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Player bounding box is a square of this size
    pub const PLAYER_SIZE: f32 = 100.0;
    /// Jump power per millisecond of charge
    pub const JUMP_COEF: f32 = 0.003;
    /// Longest charge that still adds power (ms)
    pub const MAX_CHARGE_MS: u64 = 1500;
    /// Exponent of the charge curve (> 1 rewards long holds)
    pub const CHARGE_CURVE_EXPONENT: f32 = 1.2;
    /// Horizontal velocity multiplier applied each airborne tick
    pub const AIR_RESISTANCE: f32 = 0.99;
    pub const MAX_HORIZONTAL_SPEED: f32 = 12.0;
    pub const MAX_VERTICAL_SPEED: f32 = 15.0;

    /// Auto-scroll speed while flying (units per tick)
    pub const FLIGHT_SPEED: f32 = 8.0;
    /// Flight altitude above the anchor platform's top
    pub const FLIGHT_HEIGHT: f32 = 100.0;

    /// Points per landing
    pub const LANDING_SCORE: u64 = 100;

    /// Landing envelope: horizontal slack on both sides of a platform
    pub const LANDING_TOLERANCE_X: f32 = 25.0;
    /// Landing envelope: how far above the top the feet may be
    pub const LANDING_ABOVE: f32 = 5.0;
    /// Landing envelope: how far below the top the feet may be
    pub const LANDING_BELOW: f32 = 25.0;

    /// Collectible box size
    pub const COLLECTIBLE_SIZE: f32 = 50.0;
    /// Collectible box bottom sits this far above the platform top
    pub const COLLECTIBLE_LIFT: f32 = 30.0;
    /// Extra padding around the collectible for forgiving pickups
    pub const COLLECTIBLE_PICKUP_MARGIN: f32 = 40.0;

    /// Ticks per animation frame, and frames per cycle
    pub const ANIMATION_TICKS_PER_FRAME: u32 = 5;
    pub const ANIMATION_FRAMES: u32 = 4;

    /// Camera keeps the player this far (fraction of world width) from the left edge
    pub const CAMERA_LEAD: f32 = 0.3;
}

/// Uniform draw in `[min, max)`; collapses to `min` for an empty range
#[inline]
pub fn random_between<R: rand::Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}
