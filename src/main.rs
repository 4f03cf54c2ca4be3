//! Cloud Hop entry point
//!
//! Handles platform-specific initialization. The browser build exports a
//! `WebGame` for the JS host to drive and draw; the native build plays
//! headless runs with a simple autopilot.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use wasm_bindgen::prelude::*;

    use cloud_hop::Session;
    use cloud_hop::Tuning;
    use cloud_hop::persistence::LocalStorage;
    use cloud_hop::platform::MonotonicClock;
    use cloud_hop::sim::{Collectible, Platform};

    fn js_err(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    /// Game instance driven by the page's requestAnimationFrame loop
    #[wasm_bindgen]
    pub struct WebGame {
        session: Session<LocalStorage, MonotonicClock>,
    }

    #[wasm_bindgen]
    impl WebGame {
        /// `tuning_json` may override any subset of the default tuning
        #[wasm_bindgen(constructor)]
        pub fn new(seed: f64, tuning_json: Option<String>) -> Result<WebGame, JsValue> {
            let tuning = match tuning_json {
                Some(json) => Tuning::from_json(&json).map_err(js_err)?,
                None => Tuning::default(),
            };
            let session = Session::new(
                seed as u64,
                tuning,
                LocalStorage::new(),
                MonotonicClock::new(),
            );
            Ok(Self { session })
        }

        /// Pointer/key down
        pub fn charge_start(&mut self) {
            self.session.charge_start();
        }

        /// Pointer/key up
        pub fn charge_end(&mut self) {
            self.session.charge_end();
        }

        /// Run one tick; returns the raised events as a JSON array
        pub fn update(&mut self) -> Result<String, JsValue> {
            let events = self.session.update();
            serde_json::to_string(&events).map_err(js_err)
        }

        pub fn restart(&mut self) {
            self.session.restart();
        }

        pub fn player_x(&self) -> f32 {
            self.session.state().player.pos.x
        }

        pub fn player_y(&self) -> f32 {
            self.session.state().player.pos.y
        }

        pub fn facing_right(&self) -> bool {
            self.session.state().player.facing_right
        }

        pub fn animation_frame(&self) -> u32 {
            self.session.state().player.animation_frame
        }

        pub fn camera_x(&self) -> f32 {
            self.session.state().camera_x()
        }

        pub fn charge_percent(&self) -> f32 {
            self.session.charge_percent()
        }

        pub fn score(&self) -> f64 {
            self.session.state().run.score as f64
        }

        pub fn combo(&self) -> u32 {
            self.session.state().run.combo
        }

        pub fn high_score(&self) -> f64 {
            self.session.high_score() as f64
        }

        pub fn game_over(&self) -> bool {
            self.session.state().run.game_over
        }

        pub fn flight_mode(&self) -> bool {
            self.session.state().run.flight_mode()
        }

        pub fn flight_platforms_remaining(&self) -> u32 {
            self.session.state().run.flight_platforms_remaining()
        }

        /// Live platforms, left to right, as JSON
        pub fn platforms_json(&self) -> Result<String, JsValue> {
            let platforms: Vec<&Platform> = self.session.state().platforms.iter().collect();
            serde_json::to_string(&platforms).map_err(js_err)
        }

        /// Live collectibles as JSON
        pub fn collectibles_json(&self) -> Result<String, JsValue> {
            let collectibles: &[Collectible] = self.session.state().collectibles();
            serde_json::to_string(collectibles).map_err(js_err)
        }
    }

    pub fn init_logging() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }
        log::info!("Cloud Hop (web) starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::init_logging();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use cloud_hop::Session;
    use cloud_hop::consts::{LANDING_BELOW, MAX_CHARGE_MS};
    use cloud_hop::persistence::KeyValueStore;
    use cloud_hop::platform::{Clock, ManualClock};
    use cloud_hop::sim::{
        GameEvent, GameState, Platform, Player, PlayerState, in_landing_envelope, jump_velocity,
    };

    /// Wall time per tick at 60 Hz
    const TICK_MS: u64 = 16;
    /// Give up on a run that never ends
    const MAX_TICKS_PER_RUN: u64 = 60 * 60 * 10;
    const HOLD_STEP_MS: usize = 10;
    /// Used when no hold reaches the next platform
    const FALLBACK_HOLD_MS: u64 = 800;

    /// Would a jump charged for `hold_ms` from `player` land on `target`?
    fn lands_on(player: &Player, hold_ms: u64, target: &Platform, gravity: f32) -> bool {
        let mut probe = player.clone();
        probe.vel = jump_velocity(hold_ms);
        probe.state = PlayerState::Jump;

        for _ in 0..MAX_TICKS_PER_RUN {
            probe.update(gravity);
            if probe.state != PlayerState::Fall {
                continue;
            }
            if in_landing_envelope(&probe.bounds(), target) {
                return true;
            }
            if probe.feet_y() > target.y + LANDING_BELOW {
                return false;
            }
        }
        false
    }

    /// Shortest hold that lands on the next platform to the right
    fn plan_hold(state: &GameState) -> u64 {
        let player = &state.player;
        let Some(target) = state
            .platforms
            .iter()
            .find(|p| p.x > player.center_x())
        else {
            return FALLBACK_HOLD_MS;
        };

        (HOLD_STEP_MS as u64..=MAX_CHARGE_MS)
            .step_by(HOLD_STEP_MS)
            .find(|&ms| lands_on(player, ms, target, state.tuning().gravity))
            .unwrap_or(FALLBACK_HOLD_MS)
    }

    /// Play one run to game over (or the tick limit); returns the final score
    pub fn play_run<S: KeyValueStore>(session: &mut Session<S, ManualClock>) -> u64 {
        for _ in 0..MAX_TICKS_PER_RUN {
            if session.state().player.state == PlayerState::Stand {
                let hold = plan_hold(session.state());
                session.charge_start();
                session.clock().advance(hold);
                session.charge_end();
            }

            session.clock().advance(TICK_MS);
            for event in session.update() {
                match event {
                    GameEvent::Landed { platform_id, combo } => {
                        log::debug!("Landed on {} (combo {})", platform_id, combo);
                    }
                    GameEvent::FlightStarted { quota, .. } => {
                        log::info!("Flying over the next {} platforms", quota);
                    }
                    GameEvent::GameOver { score, .. } => return score,
                    _ => {}
                }
            }
        }

        log::warn!(
            "Run stopped after {} ticks at {}ms",
            MAX_TICKS_PER_RUN,
            session.clock().now_ms()
        );
        session.state().run.score
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cloud_hop::persistence::{FileStore, KeyValueStore, MemoryStore};
    use cloud_hop::platform::ManualClock;
    use cloud_hop::{Session, Tuning};

    env_logger::init();
    log::info!("Cloud Hop (native) starting...");
    log::info!("Native mode plays headless runs - build for wasm32 to play in a browser");

    // Usage: cloud-hop [SEED] [STORE_PATH]
    let mut args = std::env::args().skip(1);
    let seed = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0xC10D);

    fn run<S: KeyValueStore>(seed: u64, store: S) {
        let mut session = Session::new(seed, Tuning::default(), store, ManualClock::new(0));
        for run in 1..=3 {
            let score = autoplay::play_run(&mut session);
            println!(
                "Run {}: score {} (best {})",
                run,
                score,
                session.high_score()
            );
            session.restart();
        }
    }

    match args.next() {
        Some(path) => run(seed, FileStore::open(path)),
        None => run(seed, MemoryStore::new()),
    }
}
