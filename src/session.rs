//! Host-facing game session
//!
//! Wires the pure simulation to the outside world: input callbacks stamp
//! edges with the clock and queue them, `update` runs exactly one tick with
//! whatever was queued, and the best score is written back to the store
//! when a run ends with a new record.

use crate::highscores::HighScore;
use crate::persistence::KeyValueStore;
use crate::platform::Clock;
use crate::sim::{GameEvent, GameState, InputEvent, InputQueue, tick};
use crate::tuning::Tuning;

pub struct Session<S: KeyValueStore, C: Clock> {
    state: GameState,
    input: InputQueue,
    high_score: HighScore,
    store: S,
    clock: C,
}

impl<S: KeyValueStore, C: Clock> Session<S, C> {
    pub fn new(seed: u64, tuning: Tuning, store: S, clock: C) -> Self {
        let high_score = HighScore::load(&store);
        let mut state = GameState::new(seed, tuning);
        state.high_score = high_score.best;
        log::info!("Session started (seed {}, best {})", seed, high_score.best);

        Self {
            state,
            input: InputQueue::new(),
            high_score,
            store,
            clock,
        }
    }

    /// Press edge
    pub fn charge_start(&mut self) {
        let at_ms = self.clock.now_ms();
        self.input.push(InputEvent::ChargeStart { at_ms });
    }

    /// Release edge
    pub fn charge_end(&mut self) {
        let at_ms = self.clock.now_ms();
        self.input.push(InputEvent::ChargeEnd { at_ms });
    }

    /// Run one tick and return the events it raised
    pub fn update(&mut self) -> Vec<GameEvent> {
        let input = self.input.drain();
        tick(&mut self.state, &input);

        let events = self.state.drain_events();
        for event in &events {
            if let GameEvent::GameOver { score, .. } = *event {
                self.record(score);
            }
        }
        events
    }

    /// Abandon the current run
    pub fn restart(&mut self) {
        self.input.drain();
        self.state.reset();
    }

    fn record(&mut self, score: u64) {
        if !self.high_score.submit(score) {
            return;
        }
        if let Err(err) = self.high_score.save(&mut self.store) {
            log::warn!("Failed to save high score {}: {}", score, err);
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best
    }

    /// Charge bar fill right now
    pub fn charge_percent(&self) -> f32 {
        self.state.player.charge_percent(self.clock.now_ms())
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
