//! Fixed-step simulation tick
//!
//! Core game loop that advances one run deterministically. Each tick first
//! applies the input edges drained for it, then runs, in order:
//!
//! 1. player physics (frozen while flying)
//! 2. platform window and power-up spawning/cleanup
//! 3. cosmetic counters
//! 4. power-up pickup, possibly entering flight
//! 5. landing, when falling
//! 6. flight auto-scroll and quota check
//! 7. fell-out-of-world check

use super::input::{InputEvent, TickInput};
use super::player::PlayerState;
use super::powerup::PickupResult;
use super::state::{Flight, FlightAnchor, GameEvent, GameState, Platform};
use crate::consts::*;

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    for event in &input.events {
        apply_input(state, *event);
    }

    // Terminal until reset
    if state.run.game_over {
        return;
    }

    state.time_ticks += 1;

    // 1. Player physics
    state.player.update(state.tuning.gravity);

    // 2. Terrain ahead, retire what is behind
    let player_x = state.player.pos.x;
    let created = state
        .platforms
        .advance_window(player_x, &state.tuning, &mut state.rng);
    state
        .powerups
        .consider_all(&mut state.platforms, &created, &mut state.rng);
    state.powerups.cleanup(player_x);

    // 3. The animation counter advances inside `Player::update`

    // 4. Power-up pickup
    let pickup = state.powerups.check_collisions(&state.player.bounds());
    if pickup.collected {
        collect_power_up(state, pickup);
    }

    // 5. Landing
    if state.player.state == PlayerState::Fall {
        let bounds = state.player.bounds();
        if let Some(platform) = state.platforms.landing_platform(&bounds).cloned() {
            land(state, &platform);
        }
    }

    // 6. Flight mode
    if let Some(flight) = state.run.flight {
        advance_flight(state, flight);
    }

    // 7. Fell out of the world
    if state.player.pos.y > state.tuning.game_height {
        game_over(state);
    }
}

fn apply_input(state: &mut GameState, event: InputEvent) {
    match event {
        InputEvent::ChargeStart { at_ms } => {
            if state.run.game_over {
                // A press on the game-over screen starts a new run
                state.reset();
                return;
            }
            state.player.start_charge(at_ms);
        }
        InputEvent::ChargeEnd { at_ms } => {
            if state.run.game_over {
                return;
            }
            if let Some(vel) = state.player.end_charge(at_ms) {
                log::debug!("Jump vx={:.2} vy={:.2}", vel.x, vel.y);
                state.events.push(GameEvent::Jumped { vel });
            }
        }
    }
}

fn collect_power_up(state: &mut GameState, pickup: PickupResult) {
    if let Some(platform) = pickup
        .platform_id
        .and_then(|id| state.platforms.get_mut(id))
    {
        platform.has_power_up = false;
    }

    let anchor = state
        .platforms
        .platform_under(state.player.pos.x)
        .map(FlightAnchor::from_platform);

    let Some(anchor) = anchor else {
        log::warn!(
            "Power-up collected with no platform under the player (x={:.1}); staying grounded",
            state.player.pos.x
        );
        state
            .events
            .push(GameEvent::PowerUpCollected { flight: false });
        return;
    };

    state.player.pos.y = anchor.flight_y();
    state.player.start_flying();
    state.run.flight = Some(Flight {
        anchor,
        quota: pickup.platforms_to_fly,
        passed: 0,
    });

    log::info!(
        "Flight started over platform {} for {} platforms",
        anchor.platform_id,
        pickup.platforms_to_fly
    );
    state
        .events
        .push(GameEvent::PowerUpCollected { flight: true });
    state.events.push(GameEvent::FlightStarted {
        anchor_id: anchor.platform_id,
        quota: pickup.platforms_to_fly,
    });
}

fn land(state: &mut GameState, platform: &Platform) {
    state.player.land(platform);
    state.run.score += LANDING_SCORE;
    state.run.combo += 1;

    log::debug!(
        "Landed on platform {} (score {}, combo {})",
        platform.id,
        state.run.score,
        state.run.combo
    );
    state.events.push(GameEvent::Landed {
        platform_id: platform.id,
        combo: state.run.combo,
    });
}

/// Auto-scroll and end the flight once enough platforms lie beyond the anchor.
///
/// Every live platform right of the anchor counts, including ones generated
/// ahead of the player that it has not reached yet.
fn advance_flight(state: &mut GameState, flight: Flight) {
    state.player.pos.x += FLIGHT_SPEED;
    state.player.pos.y = flight.anchor.flight_y();

    let passed = state.platforms.count_beyond(flight.anchor.x) as u32;
    if passed >= flight.quota {
        state.run.flight = None;
        state.player.stop_flying();
        log::info!("Flight ended after {} platforms", passed);
        state.events.push(GameEvent::FlightEnded);
    } else if let Some(active) = state.run.flight.as_mut() {
        active.passed = passed;
    }
}

fn game_over(state: &mut GameState) {
    let score = state.run.score;
    let new_high_score = score > state.high_score;

    state.run.game_over = true;
    state.run.flight = None;
    state.high_score = state.high_score.max(score);

    log::info!(
        "Game over: score {} (best {}{})",
        score,
        state.high_score,
        if new_high_score { ", new record" } else { "" }
    );
    state.events.push(GameEvent::GameOver {
        score,
        new_high_score,
    });
}
