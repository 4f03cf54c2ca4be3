//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (physics is per tick, charge timing uses stamped input)
//! - Seeded RNG only
//! - Stable iteration order (platforms by id, left to right)
//! - No rendering or platform dependencies

pub mod collision;
pub mod input;
pub mod platforms;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use collision::{Aabb, in_landing_envelope};
pub use input::{InputEvent, InputQueue, TickInput};
pub use platforms::PlatformField;
pub use player::{Player, PlayerState, jump_velocity};
pub use powerup::{PickupResult, PowerUpDirector};
pub use state::{
    Collectible, Flight, FlightAnchor, GameEvent, GameState, Platform, PlatformId, RunState,
};
pub use tick::tick;
